//! Report assembly.
//!
//! A report is the JSON document posted to the metrics platform once per
//! cycle: an `agent` stanza describing this process and a single component
//! stanza describing the host and carrying its metrics.

mod builder;
mod identity;

pub use builder::{filesystem_metric_name, ReportBuilder};
pub use identity::{build_agent_identity, log_host_banner};
