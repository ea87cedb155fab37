use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};

use crate::collectors::source::StatsSource;
use crate::constants::GLUSTER_FS_TYPE;
use crate::models::{FilesystemUsage, MountedFilesystem};

/// Whether a mount is a GlusterFS client mount we report on
pub fn is_monitored(mount: &MountedFilesystem) -> bool {
    mount.fstype == GLUSTER_FS_TYPE
}

/// Utilization of every monitored mountpoint.
///
/// Each query runs on the blocking pool and is bounded by `timeout`, since a
/// hung FUSE mount blocks `statvfs(3)` indefinitely. A mountpoint whose usage
/// cannot be read in time is logged and skipped; the others are still
/// returned. If the mount table itself is unreadable the result is empty.
pub async fn collect_filesystem_usage<S>(source: &Arc<S>, timeout: Duration) -> Vec<FilesystemUsage>
where
    S: StatsSource + 'static,
{
    let mounts = match source.list_mounted_filesystems() {
        Ok(mounts) => mounts,
        Err(e) => {
            error!("Failed to list mounted filesystems: {e}");
            return Vec::new();
        }
    };

    let mut usage = Vec::new();
    for mount in mounts.into_iter().filter(is_monitored) {
        let query = {
            let source = Arc::clone(source);
            let mountpoint = mount.mountpoint.clone();
            tokio::task::spawn_blocking(move || source.disk_usage(&mountpoint))
        };

        match tokio::time::timeout(timeout, query).await {
            Ok(Ok(Ok(percent_used))) => usage.push(FilesystemUsage {
                device: mount.device,
                mountpoint: mount.mountpoint,
                percent_used,
            }),
            Ok(Ok(Err(e))) => error!("Skipping {} ({}): {e}", mount.mountpoint, mount.device),
            Ok(Err(e)) => error!("Usage query for {} panicked: {e}", mount.mountpoint),
            Err(_) => warn!(
                "Skipping {} ({}): no answer within {}s, mount may be hung",
                mount.mountpoint,
                mount.device,
                timeout.as_secs_f64()
            ),
        }
    }

    debug!("Collected utilization for {} gluster mounts", usage.len());
    usage
}
