// Re-export all items from the submodules
mod agent_config;

pub use agent_config::{
    load_config,
    AgentConfig,
    GlusterSection,
    PluginSection,
    ProxySection,
    SiteSection,
};

pub(crate) use agent_config::redact;
