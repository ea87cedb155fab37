//! Statistics collection.
//!
//! Everything the agent knows about the host comes through [`StatsSource`].
//! The production source reads procfs and sysfs; tests substitute their own.
//!
//! - [`procfs`]: the Linux source (`/proc/mounts`, `/proc/diskstats`, `statvfs`)
//! - [`filesystem`]: per-mountpoint utilization of GlusterFS client mounts
//! - [`delta`]: turns cumulative disk counters into per-interval deltas

pub mod delta;
pub mod filesystem;
pub mod procfs;
pub mod source;

pub use delta::{disk_metric_name, CounterCategory, DeltaEngine};
pub use filesystem::{collect_filesystem_usage, is_monitored};
pub use procfs::ProcfsStatsSource;
pub use source::StatsSource;
