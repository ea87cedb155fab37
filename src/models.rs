use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cumulative disk I/O counters captured at one instant.
///
/// Keys are counter names such as `bytes_read` or `write_time_ms`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    counters: BTreeMap<String, u64>,
}

impl CounterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counters.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for CounterSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self {
            counters: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A filesystem as listed in the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedFilesystem {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

/// Instantaneous utilization of one monitored mountpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesystemUsage {
    pub device: String,
    pub mountpoint: String,
    pub percent_used: f64,
}

/// Value of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(u64),
    Float(f64),
}

/// Metrics keyed by fully-qualified name, e.g.
/// `Component/Disk/IO/bytes_read[bytes]`.
pub type MetricSet = BTreeMap<String, MetricValue>;

/// The `agent` stanza of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub host: String,
    pub pid: u32,
    pub version: String,
}

/// The `components[]` stanza of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub guid: String,
    /// Seconds covered by the metrics, i.e. the collection interval
    pub duration: u64,
    pub metrics: MetricSet,
}

/// One submission to the metrics platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub agent: AgentIdentity,
    pub components: Vec<Component>,
}

impl Report {
    /// Total number of metrics across all components
    pub fn metric_count(&self) -> usize {
        self.components.iter().map(|c| c.metrics.len()).sum()
    }
}
