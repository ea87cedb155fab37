//! # gluster-metrics-agent
//!
//! A small agent for GlusterFS storage nodes that reports volume utilization
//! and disk I/O activity to the New Relic platform API.
//!
//! ## Overview
//!
//! Once per interval the agent:
//!
//! 1. Reads the utilization of every `fuse.glusterfs` mount
//! 2. Reads the host's cumulative disk I/O counters and turns them into
//!    per-interval deltas against the previous cycle
//! 3. Wraps both in a single JSON report and POSTs it over HTTPS
//!
//! The first cycle captures a baseline and waits one interval before
//! reporting, so the first deltas are never the raw counters since boot.
//!
//! ## Usage
//!
//! ```no_run
//! use gluster_metrics_agent::agent::Agent;
//! use gluster_metrics_agent::collectors::ProcfsStatsSource;
//! use gluster_metrics_agent::config::load_config;
//! use gluster_metrics_agent::report::build_agent_identity;
//! use gluster_metrics_agent::transport::HttpsTransport;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = load_config(Path::new("/etc/gluster-metrics-agent.yaml"))?;
//! let transport = HttpsTransport::from_config(&config)?;
//!
//! let mut agent = Agent::new(
//!     ProcfsStatsSource::new(),
//!     transport,
//!     build_agent_identity(),
//!     config.interval(),
//! );
//! agent.run_cycle().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`]: The collection loop
//! - [`collectors`]: Operating system statistics and the delta engine
//! - [`report`]: Report assembly and agent identity
//! - [`transport`]: Report delivery over HTTPS
//! - [`config`]: YAML configuration and validation
//! - [`error`]: Error types for each stage of a cycle
//!
//! ## Safety
//!
//! The only `unsafe` code is the `statvfs(3)` call in
//! [`collectors::procfs`].

/// The collection loop
pub mod agent;

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Statistics sources, filesystem utilization and disk deltas
pub mod collectors;

/// Configuration loading and validation
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Error types
pub mod error;

/// Logger initialization
pub mod logging;

/// Core data models and structures used throughout the application
pub mod models;

/// Report assembly
pub mod report;

/// Report delivery
pub mod transport;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
