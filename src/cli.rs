use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_CONFIG_PATH;

/// Command-line arguments for the gluster metrics agent.
///
/// Without a subcommand the agent loads its configuration and runs the
/// collection loop in the foreground until interrupted.
#[derive(Parser, Debug)]
#[clap(
    name = "gluster-metrics-agent",
    version,
    about = "Reports GlusterFS volume utilization and disk I/O to a metrics platform"
)]
pub struct Args {
    /// Path to configuration YAML file
    #[clap(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Verbose logging (overrides plugin.loglevel)
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the agent.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Create a default configuration file
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = "gluster-metrics-agent.yaml")]
        path: PathBuf,
    },
}
