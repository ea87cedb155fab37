use log::{debug, info, warn};
use sysinfo::{System, SystemExt};

use crate::constants::{AGENT_VERSION, PLUGIN_NAME};
use crate::models::AgentIdentity;

/// Identity of this agent process, computed once at startup.
pub fn build_agent_identity() -> AgentIdentity {
    AgentIdentity {
        host: resolve_hostname(),
        pid: std::process::id(),
        version: AGENT_VERSION.to_string(),
    }
}

fn resolve_hostname() -> String {
    match hostname::get() {
        Ok(name) => {
            let name = name.to_string_lossy().trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
        Err(e) => warn!("Failed to read hostname: {e}"),
    }

    // sysinfo reads the same uname data through a different path
    let system = System::new();
    match system.host_name() {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            warn!("Hostname unavailable, reporting as localhost");
            "localhost".to_string()
        }
    }
}

/// Log the startup banner with the host facts operators usually ask for.
pub fn log_host_banner(identity: &AgentIdentity) {
    let system = System::new();
    info!(
        "{} agent {} starting on {} (pid {})",
        PLUGIN_NAME, identity.version, identity.host, identity.pid
    );
    debug!(
        "Host: os={} version={} kernel={}",
        system.name().unwrap_or_else(|| "unknown".to_string()),
        system.os_version().unwrap_or_else(|| "unknown".to_string()),
        system.kernel_version().unwrap_or_else(|| "unknown".to_string()),
    );
}
