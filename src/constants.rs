//! Global constants for the gluster metrics agent.
//!
//! Metric names, counter keys and default locations shared across modules.

// Report identity
/// GUID identifying this plugin on the metrics platform
pub const PLUGIN_GUID: &str = "com.rhel.gluster_statistics";

/// Human-readable plugin name, used in log banners
pub const PLUGIN_NAME: &str = "Gluster Statistics";

/// Agent version reported in the agent stanza
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default metrics ingestion endpoint
pub const DEFAULT_API_URL: &str = "https://platform-api.newrelic.com/platform/v1/metrics";

// Transport
/// Header carrying the license key
pub const LICENSE_KEY_HEADER: &str = "X-License-Key";

/// Fixed timeout applied to every submission, in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 5;

// Scheduling
/// Default collection interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

// Filesystems
/// Filesystem type of a GlusterFS client mount
pub const GLUSTER_FS_TYPE: &str = "fuse.glusterfs";

/// Upper bound on one mountpoint usage query, in seconds
pub const USAGE_QUERY_TIMEOUT_SECS: u64 = 5;

/// Replacement for `/` inside metric name segments
pub const METRIC_PATH_SEPARATOR: char = '|';

/// Bytes per sector in `/proc/diskstats`, fixed by the kernel ABI
pub const DISKSTATS_SECTOR_SIZE: u64 = 512;

// Metric name prefixes
pub const METRIC_PREFIX_GLUSTER: &str = "Component/Gluster";
pub const METRIC_PREFIX_DISK_IO: &str = "Component/Disk/IO";
pub const METRIC_PREFIX_DISK_COUNT: &str = "Component/Disk/Read-Write Count";
pub const METRIC_PREFIX_DISK_TIME: &str = "Component/Disk/Read-Write Time";

// Counter names
pub const COUNTER_BYTES_READ: &str = "bytes_read";
pub const COUNTER_BYTES_WRITTEN: &str = "bytes_written";
pub const COUNTER_READ_COUNT: &str = "read_count";
pub const COUNTER_WRITE_COUNT: &str = "write_count";
pub const COUNTER_READ_TIME: &str = "read_time_ms";
pub const COUNTER_WRITE_TIME: &str = "write_time_ms";

// File paths
pub const PROC_MOUNTS_PATH: &str = "/proc/mounts";
pub const PROC_DISKSTATS_PATH: &str = "/proc/diskstats";
pub const SYS_BLOCK_PATH: &str = "/sys/block";

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gluster-metrics-agent.yaml";

/// Environment variable overriding `site.key`
pub const LICENSE_KEY_ENV_VAR: &str = "GLUSTER_AGENT_LICENSE_KEY";
