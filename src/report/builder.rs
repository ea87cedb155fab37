use std::time::Duration;

use log::{debug, warn};

use crate::constants::{METRIC_PATH_SEPARATOR, METRIC_PREFIX_GLUSTER, PLUGIN_GUID};
use crate::models::{AgentIdentity, Component, FilesystemUsage, MetricSet, MetricValue, Report};

/// Metric name for a mountpoint's utilization.
///
/// `/` would be read as a path separator by the platform, so it is replaced
/// in both the device and the mountpoint.
pub fn filesystem_metric_name(device: &str, mountpoint: &str) -> String {
    format!(
        "{}/{}/{}[percent]",
        METRIC_PREFIX_GLUSTER,
        device.replace('/', &METRIC_PATH_SEPARATOR.to_string()),
        mountpoint.replace('/', &METRIC_PATH_SEPARATOR.to_string()),
    )
}

/// Assembles one report per cycle and owns it until [`ReportBuilder::reset`].
#[derive(Debug)]
pub struct ReportBuilder {
    identity: AgentIdentity,
    duration_secs: u64,
    report: Option<Report>,
}

impl ReportBuilder {
    pub fn new(identity: AgentIdentity, interval: Duration) -> Self {
        Self {
            identity,
            duration_secs: interval.as_secs(),
            report: None,
        }
    }

    /// Merge filesystem utilization with the disk deltas and wrap them in
    /// the agent and component stanzas.
    pub fn build_report(&mut self, fs_usage: &[FilesystemUsage], disk_metrics: MetricSet) -> &Report {
        if self.report.is_some() {
            warn!("Previous report was not reset, discarding it");
        }

        let mut metrics = MetricSet::new();
        for usage in fs_usage {
            metrics.insert(
                filesystem_metric_name(&usage.device, &usage.mountpoint),
                MetricValue::Float(usage.percent_used),
            );
        }
        metrics.extend(disk_metrics);

        debug!("Built report with {} metrics", metrics.len());

        self.report.insert(Report {
            agent: self.identity.clone(),
            components: vec![Component {
                name: self.identity.host.clone(),
                guid: PLUGIN_GUID.to_string(),
                duration: self.duration_secs,
                metrics,
            }],
        })
    }

    /// The report built this cycle, if any
    pub fn current(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Number of metrics held for the current cycle
    pub fn pending_metrics(&self) -> usize {
        self.report.as_ref().map_or(0, Report::metric_count)
    }

    /// Drop everything built this cycle. Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generators::test_identity;
    use serde_json::json;

    fn usage(device: &str, mountpoint: &str, percent_used: f64) -> FilesystemUsage {
        FilesystemUsage {
            device: device.to_string(),
            mountpoint: mountpoint.to_string(),
            percent_used,
        }
    }

    #[test]
    fn test_filesystem_metric_name_replaces_slashes() {
        assert_eq!(
            filesystem_metric_name("gluster1:/gv0", "/mnt/gv0"),
            "Component/Gluster/gluster1:|gv0/|mnt|gv0[percent]"
        );
    }

    #[test]
    fn test_build_report_merges_metrics() {
        let mut builder = ReportBuilder::new(test_identity(), Duration::from_secs(60));

        let mut disk = MetricSet::new();
        disk.insert("Component/Disk/IO/bytes_read[bytes]".to_string(), MetricValue::Integer(500));

        let report = builder.build_report(&[usage("gluster1:/gv0", "/mnt/gv0", 42.5)], disk);

        assert_eq!(report.agent, test_identity());
        assert_eq!(report.components.len(), 1);
        let component = &report.components[0];
        assert_eq!(component.name, "storage-01");
        assert_eq!(component.guid, "com.rhel.gluster_statistics");
        assert_eq!(component.duration, 60);
        assert_eq!(component.metrics.len(), 2);
        assert_eq!(
            component.metrics.get("Component/Gluster/gluster1:|gv0/|mnt|gv0[percent]"),
            Some(&MetricValue::Float(42.5))
        );
        assert_eq!(builder.pending_metrics(), 2);
    }

    #[test]
    fn test_report_json_shape() {
        let mut builder = ReportBuilder::new(test_identity(), Duration::from_secs(30));
        let mut disk = MetricSet::new();
        disk.insert("Component/Disk/Read-Write Count/read_count[integer]".to_string(), MetricValue::Integer(2));

        let report = builder.build_report(&[usage("gluster1:/gv0", "/mnt/gv0", 10.0)], disk);
        let value = serde_json::to_value(report).unwrap();

        assert_eq!(
            value,
            json!({
                "agent": { "host": "storage-01", "pid": 4242, "version": "0.0.0-test" },
                "components": [{
                    "name": "storage-01",
                    "guid": "com.rhel.gluster_statistics",
                    "duration": 30,
                    "metrics": {
                        "Component/Disk/Read-Write Count/read_count[integer]": 2,
                        "Component/Gluster/gluster1:|gv0/|mnt|gv0[percent]": 10.0
                    }
                }]
            })
        );
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut builder = ReportBuilder::new(test_identity(), Duration::from_secs(60));
        builder.build_report(&[usage("d", "/m", 1.0)], MetricSet::new());
        assert_eq!(builder.pending_metrics(), 1);

        builder.reset();
        assert_eq!(builder.pending_metrics(), 0);
        assert!(builder.current().is_none());

        builder.reset();
        assert_eq!(builder.pending_metrics(), 0);
        assert!(builder.current().is_none());
    }

    #[test]
    fn test_reports_do_not_leak_between_cycles() {
        let mut builder = ReportBuilder::new(test_identity(), Duration::from_secs(60));
        builder.build_report(&[usage("d", "/first", 1.0)], MetricSet::new());
        builder.reset();

        let report = builder.build_report(&[usage("d", "/second", 2.0)], MetricSet::new());
        let metrics = &report.components[0].metrics;
        assert_eq!(metrics.len(), 1);
        assert!(metrics.contains_key("Component/Gluster/d/|second[percent]"));
    }

    #[test]
    fn test_empty_cycle_still_builds_a_report() {
        let mut builder = ReportBuilder::new(test_identity(), Duration::from_secs(60));
        let report = builder.build_report(&[], MetricSet::new());
        assert_eq!(report.metric_count(), 0);
        assert_eq!(report.components[0].name, "storage-01");
    }
}
