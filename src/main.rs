use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use tokio::runtime::Runtime;

use gluster_metrics_agent::agent::Agent;
use gluster_metrics_agent::cli::{Args, Commands};
use gluster_metrics_agent::collectors::ProcfsStatsSource;
use gluster_metrics_agent::config::{load_config, AgentConfig};
use gluster_metrics_agent::logging::initialize_logging;
use gluster_metrics_agent::report::{build_agent_identity, log_host_banner};
use gluster_metrics_agent::transport::HttpsTransport;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Handle subcommands
    if let Some(cmd) = &args.command {
        initialize_logging(LevelFilter::Info, None)?;
        return handle_subcommand(cmd);
    }

    // Load configuration; nothing runs with an invalid one
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    // Initialize logging
    let level = if args.verbose { LevelFilter::Debug } else { config.log_level() };
    initialize_logging(level, config.plugin.logfile.as_deref().map(Path::new))?;

    info!("Starting gluster metrics agent");
    config.log_summary();

    let identity = build_agent_identity();
    log_host_banner(&identity);

    let runtime = Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(async {
        let transport = HttpsTransport::from_config(&config)?;
        let mut agent = Agent::new(ProcfsStatsSource::new(), transport, identity, config.interval());
        agent.run_until(shutdown_signal()).await;
        Ok::<(), anyhow::Error>(())
    })?;

    info!("Gluster metrics agent stopped");
    Ok(())
}

/// Handle subcommands (init-config)
fn handle_subcommand(cmd: &Commands) -> Result<()> {
    match cmd {
        Commands::InitConfig { path } => {
            info!("Creating default configuration file at {}", path.display());
            AgentConfig::create_default_config_file(path)?;
            info!("Configuration created; set site.key before starting the agent");
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C / SIGINT.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupt received, shutting down"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
