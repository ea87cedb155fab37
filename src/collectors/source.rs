use crate::error::CollectionResult;
use crate::models::{CounterSnapshot, MountedFilesystem};

/// Operating-system statistics queried once per collection cycle.
///
/// Implementations must be cheap to call repeatedly and must not cache
/// values across calls: every call reflects the system at that instant.
#[cfg_attr(test, mockall::automock)]
pub trait StatsSource: Send + Sync {
    /// Every filesystem in the mount table, unfiltered.
    fn list_mounted_filesystems(&self) -> CollectionResult<Vec<MountedFilesystem>>;

    /// Used space of the filesystem mounted at `mountpoint`, as a percentage
    /// in `0.0..=100.0`.
    fn disk_usage(&self, mountpoint: &str) -> CollectionResult<f64>;

    /// System-wide cumulative disk I/O counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the counters cannot be read at all. Counters that
    /// are individually unavailable are simply absent from the snapshot.
    fn disk_io_counters(&self) -> CollectionResult<CounterSnapshot>;
}
