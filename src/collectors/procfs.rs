use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::collectors::source::StatsSource;
use crate::constants::{
    COUNTER_BYTES_READ, COUNTER_BYTES_WRITTEN, COUNTER_READ_COUNT, COUNTER_READ_TIME,
    COUNTER_WRITE_COUNT, COUNTER_WRITE_TIME, DISKSTATS_SECTOR_SIZE, PROC_DISKSTATS_PATH,
    PROC_MOUNTS_PATH, SYS_BLOCK_PATH,
};
use crate::error::{CollectionError, CollectionResult};
use crate::models::{CounterSnapshot, MountedFilesystem};

/// Statistics source backed by procfs, sysfs and `statvfs(3)`.
#[derive(Debug, Clone)]
pub struct ProcfsStatsSource {
    mounts_path: PathBuf,
    diskstats_path: PathBuf,
    sys_block_path: PathBuf,
}

impl Default for ProcfsStatsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcfsStatsSource {
    pub fn new() -> Self {
        Self::with_paths(PROC_MOUNTS_PATH, PROC_DISKSTATS_PATH, SYS_BLOCK_PATH)
    }

    /// Read from alternative locations, e.g. a host `/proc` bind-mounted
    /// into a container.
    pub fn with_paths(
        mounts_path: impl AsRef<Path>,
        diskstats_path: impl AsRef<Path>,
        sys_block_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            mounts_path: mounts_path.as_ref().to_path_buf(),
            diskstats_path: diskstats_path.as_ref().to_path_buf(),
            sys_block_path: sys_block_path.as_ref().to_path_buf(),
        }
    }

    fn read(path: &Path) -> CollectionResult<String> {
        fs::read_to_string(path).map_err(|source| CollectionError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whole block devices appear under `/sys/block`; partitions do not.
    fn is_whole_disk(&self, name: &str) -> bool {
        if name.starts_with("loop") || name.starts_with("ram") {
            return false;
        }
        // sysfs spells `/` in device names as `!` (cciss/c0d0 -> cciss!c0d0)
        self.sys_block_path.join(name.replace('/', "!")).exists()
    }
}

impl StatsSource for ProcfsStatsSource {
    fn list_mounted_filesystems(&self) -> CollectionResult<Vec<MountedFilesystem>> {
        let content = Self::read(&self.mounts_path)?;
        let mounts = parse_mounts(&content);
        trace!("Read {} mount entries from {}", mounts.len(), self.mounts_path.display());
        Ok(mounts)
    }

    fn disk_usage(&self, mountpoint: &str) -> CollectionResult<f64> {
        statvfs_percent_used(mountpoint).map_err(|source| CollectionError::Statvfs {
            mountpoint: mountpoint.to_string(),
            source,
        })
    }

    fn disk_io_counters(&self) -> CollectionResult<CounterSnapshot> {
        let content = Self::read(&self.diskstats_path)?;
        let snapshot = parse_diskstats(&content, |name| self.is_whole_disk(name))?;
        debug!("Disk I/O counters: {:?}", snapshot);
        Ok(snapshot)
    }
}

/// Parse a `/proc/mounts` style table.
///
/// Fields are space separated; spaces, tabs, newlines and backslashes inside
/// a field are written as three-digit octal escapes.
pub fn parse_mounts(content: &str) -> Vec<MountedFilesystem> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let fstype = fields.next()?;
            Some(MountedFilesystem {
                device: unescape_mount_field(device),
                mountpoint: unescape_mount_field(mountpoint),
                fstype: fstype.to_string(),
            })
        })
        .collect()
}

fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Sum `/proc/diskstats` over the devices accepted by `include`.
///
/// Field layout (1-based, after major/minor/name): 4 reads completed,
/// 6 sectors read, 7 ms reading, 8 writes completed, 10 sectors written,
/// 11 ms writing.
pub fn parse_diskstats<F>(content: &str, include: F) -> CollectionResult<CounterSnapshot>
where
    F: Fn(&str) -> bool,
{
    let mut read_count: u64 = 0;
    let mut write_count: u64 = 0;
    let mut sectors_read: u64 = 0;
    let mut sectors_written: u64 = 0;
    let mut read_time: u64 = 0;
    let mut write_time: u64 = 0;
    let mut well_formed = 0usize;

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 14 {
            continue;
        }
        well_formed += 1;

        let name = fields[2];
        if !include(name) {
            continue;
        }

        let field = |idx: usize| fields[idx].parse::<u64>().unwrap_or(0);
        read_count = read_count.wrapping_add(field(3));
        sectors_read = sectors_read.wrapping_add(field(5));
        read_time = read_time.wrapping_add(field(6));
        write_count = write_count.wrapping_add(field(7));
        sectors_written = sectors_written.wrapping_add(field(9));
        write_time = write_time.wrapping_add(field(10));
    }

    if well_formed == 0 {
        return Err(CollectionError::Malformed {
            what: "diskstats",
            detail: "no device lines with at least 14 fields".to_string(),
        });
    }

    Ok([
        (COUNTER_BYTES_READ, sectors_read.wrapping_mul(DISKSTATS_SECTOR_SIZE)),
        (COUNTER_BYTES_WRITTEN, sectors_written.wrapping_mul(DISKSTATS_SECTOR_SIZE)),
        (COUNTER_READ_COUNT, read_count),
        (COUNTER_WRITE_COUNT, write_count),
        (COUNTER_READ_TIME, read_time),
        (COUNTER_WRITE_TIME, write_time),
    ]
    .into_iter()
    .collect())
}

/// Percentage of space used, as `df` reports it: blocks reserved for root
/// count as neither used nor available. Rounded to one decimal place.
pub fn percent_used(blocks: u64, blocks_free: u64, blocks_avail: u64) -> f64 {
    let used = blocks.saturating_sub(blocks_free);
    let total_user = used + blocks_avail;
    if total_user == 0 {
        return 0.0;
    }
    let percent = used as f64 / total_user as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

#[cfg(unix)]
fn statvfs_percent_used(mountpoint: &str) -> std::io::Result<f64> {
    use std::ffi::CString;

    let c_path = CString::new(mountpoint)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the
    // call, and `stat` is a plain C struct that statvfs fully initializes on
    // success. We only read it when the call returns 0.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(percent_used(
        stat.f_blocks as u64,
        stat.f_bfree as u64,
        stat.f_bavail as u64,
    ))
}

#[cfg(not(unix))]
fn statvfs_percent_used(_mountpoint: &str) -> std::io::Result<f64> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "statvfs is only available on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_temp_dir, create_temp_file};

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
gluster1:/gv0 /mnt/gv0 fuse.glusterfs rw,relatime,user_id=0,group_id=0 0 0
gluster1:/gv1 /mnt/my\\040volume fuse.glusterfs rw,relatime 0 0
";

    const DISKSTATS: &str = "\
   8       0 sda 1000 10 8000 300 2000 20 16000 600 0 900 900 0 0 0 0
   8       1 sda1 900 10 7000 250 1900 20 15000 550 0 800 800 0 0 0 0
 259       0 nvme0n1 100 0 2000 40 50 0 1000 10 0 50 50
   7       0 loop0 5 0 10 1 0 0 0 0 0 1 1
";

    #[test]
    fn test_parse_mounts() {
        let mounts = parse_mounts(MOUNTS);
        assert_eq!(mounts.len(), 4);
        assert_eq!(
            mounts[2],
            MountedFilesystem {
                device: "gluster1:/gv0".to_string(),
                mountpoint: "/mnt/gv0".to_string(),
                fstype: "fuse.glusterfs".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_mounts_decodes_octal_escapes() {
        let mounts = parse_mounts(MOUNTS);
        assert_eq!(mounts[3].mountpoint, "/mnt/my volume");
    }

    #[test]
    fn test_parse_mounts_skips_short_lines() {
        let mounts = parse_mounts("garbage\n\n/dev/sda1 /\n");
        assert!(mounts.is_empty());
    }

    #[test]
    fn test_unescape_leaves_unknown_sequences() {
        assert_eq!(unescape_mount_field("a\\b"), "a\\b");
        assert_eq!(unescape_mount_field("tab\\011end"), "tab\tend");
        assert_eq!(unescape_mount_field("trailing\\04"), "trailing\\04");
    }

    #[test]
    fn test_parse_diskstats_sums_selected_devices() {
        let snapshot =
            parse_diskstats(DISKSTATS, |name| name == "sda" || name == "nvme0n1").unwrap();

        assert_eq!(snapshot.get(COUNTER_READ_COUNT), Some(1100));
        assert_eq!(snapshot.get(COUNTER_WRITE_COUNT), Some(2050));
        assert_eq!(snapshot.get(COUNTER_BYTES_READ), Some(10_000 * 512));
        assert_eq!(snapshot.get(COUNTER_BYTES_WRITTEN), Some(17_000 * 512));
        assert_eq!(snapshot.get(COUNTER_READ_TIME), Some(340));
        assert_eq!(snapshot.get(COUNTER_WRITE_TIME), Some(610));
        assert_eq!(snapshot.len(), 6);
    }

    #[test]
    fn test_parse_diskstats_no_devices_selected_is_zero() {
        let snapshot = parse_diskstats(DISKSTATS, |_| false).unwrap();
        assert_eq!(snapshot.get(COUNTER_READ_COUNT), Some(0));
    }

    #[test]
    fn test_parse_diskstats_rejects_garbage() {
        let err = parse_diskstats("not diskstats at all\n", |_| true).unwrap_err();
        assert!(matches!(err, CollectionError::Malformed { .. }));
    }

    #[test]
    fn test_percent_used_matches_df() {
        // 100 blocks, 40 free of which 30 available to users: 60 / 90
        assert_eq!(percent_used(100, 40, 30), 66.7);
        assert_eq!(percent_used(0, 0, 0), 0.0);
        assert_eq!(percent_used(100, 100, 100), 0.0);
        assert_eq!(percent_used(100, 0, 0), 100.0);
    }

    #[test]
    fn test_source_reads_alternative_paths() {
        let mounts = create_temp_file(MOUNTS.as_bytes()).unwrap();
        let diskstats = create_temp_file(DISKSTATS.as_bytes()).unwrap();
        let sys_block = create_temp_dir().unwrap();
        fs::create_dir(sys_block.path().join("sda")).unwrap();
        fs::create_dir(sys_block.path().join("loop0")).unwrap();

        let source = ProcfsStatsSource::with_paths(mounts.path(), diskstats.path(), sys_block.path());

        let listed = source.list_mounted_filesystems().unwrap();
        assert_eq!(listed.len(), 4);

        // sda only: sda1 is a partition, nvme0n1 is absent from sys/block,
        // loop devices are always excluded
        let counters = source.disk_io_counters().unwrap();
        assert_eq!(counters.get(COUNTER_READ_COUNT), Some(1000));
        assert_eq!(counters.get(COUNTER_WRITE_TIME), Some(600));
    }

    #[test]
    fn test_source_missing_file_is_read_error() {
        let source = ProcfsStatsSource::with_paths("/nonexistent/mounts", "/nonexistent/diskstats", "/nonexistent");
        assert!(matches!(
            source.list_mounted_filesystems(),
            Err(CollectionError::Read { .. })
        ));
        assert!(matches!(
            source.disk_io_counters(),
            Err(CollectionError::Read { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_disk_usage_of_root() {
        let source = ProcfsStatsSource::new();
        let percent = source.disk_usage("/").unwrap();
        assert!((0.0..=100.0).contains(&percent));
    }

    #[cfg(unix)]
    #[test]
    fn test_disk_usage_of_missing_mountpoint() {
        let source = ProcfsStatsSource::new();
        let err = source.disk_usage("/nonexistent/mountpoint").unwrap_err();
        assert!(matches!(err, CollectionError::Statvfs { .. }));
    }
}
