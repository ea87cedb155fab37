//! Test utilities for the gluster metrics agent
//!
//! This module provides common testing utilities, helpers, and mocks
//! for use across all test modules.

#![cfg(test)]

use anyhow::Result;
use tempfile::{NamedTempFile, TempDir};

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a temporary file with the given content
pub fn create_temp_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    use std::io::Write;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Test data generators for common types
pub mod generators {
    use crate::config::AgentConfig;
    use crate::models::{AgentIdentity, CounterSnapshot, MountedFilesystem};

    /// Build a snapshot from literal pairs
    pub fn snapshot(pairs: &[(&str, u64)]) -> CounterSnapshot {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// A GlusterFS client mount
    pub fn gluster_mount(volume: &str, mountpoint: &str) -> MountedFilesystem {
        MountedFilesystem {
            device: format!("gluster1:/{volume}"),
            mountpoint: mountpoint.to_string(),
            fstype: "fuse.glusterfs".to_string(),
        }
    }

    /// A local, non-gluster mount
    pub fn local_mount(device: &str, mountpoint: &str) -> MountedFilesystem {
        MountedFilesystem {
            device: device.to_string(),
            mountpoint: mountpoint.to_string(),
            fstype: "ext4".to_string(),
        }
    }

    pub fn test_identity() -> AgentIdentity {
        AgentIdentity {
            host: "storage-01".to_string(),
            pid: 4242,
            version: "0.0.0-test".to_string(),
        }
    }

    /// A configuration that passes validation
    pub fn test_config() -> AgentConfig {
        let mut config = AgentConfig::default();
        config.site.key = "0123456789abcdef0123".to_string();
        config
    }
}
