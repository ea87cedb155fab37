use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_URL, DEFAULT_INTERVAL_SECS, LICENSE_KEY_ENV_VAR};
use crate::error::ConfigError;

/// Role of this node in the storage cluster.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct GlusterSection {
    /// `true` on storage servers, `false` on pure clients
    #[serde(default)]
    pub server: bool,
}

/// Site credentials.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SiteSection {
    /// License key sent with every report
    #[serde(default)]
    pub key: String,
}

impl fmt::Debug for SiteSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteSection")
            .field("key", &redact(&self.key))
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PluginSection {
    /// Collection interval in seconds
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Optional log file, in addition to the terminal
    #[serde(default)]
    pub logfile: Option<String>,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for PluginSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            logfile: None,
            loglevel: default_loglevel(),
            endpoint: default_endpoint(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProxySection {
    #[serde(default)]
    pub enable_proxy: bool,
    #[serde(default)]
    pub proxy_host: String,
    #[serde(default = "default_proxy_port")]
    pub proxy_port: u16,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            enable_proxy: false,
            proxy_host: String::new(),
            proxy_port: default_proxy_port(),
        }
    }
}

/// Settings consumed by the agent at startup.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    #[serde(default)]
    pub gluster: GlusterSection,
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub plugin: PluginSection,
    #[serde(default)]
    pub proxy: ProxySection,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_proxy_port() -> u16 {
    3128
}

/// Keep the last four characters of a secret for log correlation.
pub(crate) fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "<REDACTED>".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("<REDACTED>...{tail}")
}

impl AgentConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AgentConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml).context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Create a default configuration YAML file
    pub fn create_default_config_file(path: &Path) -> Result<()> {
        AgentConfig::default().save_to_yaml_file(path)
    }

    /// Apply environment overrides on top of the file contents
    pub fn apply_environment(&mut self) {
        if let Ok(key) = std::env::var(LICENSE_KEY_ENV_VAR) {
            if !key.trim().is_empty() {
                debug!("License key taken from {LICENSE_KEY_ENV_VAR}");
                self.site.key = key.trim().to_string();
            }
        }
    }

    /// Check that every required setting is present and usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "site.key",
                reason: "license key must not be empty".to_string(),
            });
        }

        if self.plugin.interval == 0 {
            return Err(ConfigError::Invalid {
                field: "plugin.interval",
                reason: "interval must be at least one second".to_string(),
            });
        }

        if self.plugin.loglevel.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::Invalid {
                field: "plugin.loglevel",
                reason: format!("unknown log level '{}'", self.plugin.loglevel),
            });
        }

        if !self.plugin.endpoint.starts_with("https://") && !self.plugin.endpoint.starts_with("http://") {
            return Err(ConfigError::Invalid {
                field: "plugin.endpoint",
                reason: format!("'{}' is not an http(s) URL", self.plugin.endpoint),
            });
        }

        if !self.uses_tls() {
            warn!(
                "plugin.endpoint {} is not HTTPS, the license key will be sent in clear text",
                self.plugin.endpoint
            );
        }

        if self.proxy.enable_proxy {
            if self.proxy.proxy_host.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "proxy.proxy_host",
                    reason: "proxy is enabled but no host is set".to_string(),
                });
            }
            if self.proxy.proxy_port == 0 {
                return Err(ConfigError::Invalid {
                    field: "proxy.proxy_port",
                    reason: "proxy port must be non-zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Whether reports are posted over TLS
    pub fn uses_tls(&self) -> bool {
        self.plugin.endpoint.starts_with("https://")
    }

    /// Collection interval, which is also the priming wait
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.plugin.interval)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.plugin.loglevel.parse().unwrap_or(LevelFilter::Info)
    }

    /// Log the effective settings, with the license key redacted.
    pub fn log_summary(&self) {
        info!(
            "Configuration: interval={}s, server_role={}, endpoint={}, proxy={}, key={}",
            self.plugin.interval,
            self.gluster.server,
            self.plugin.endpoint,
            self.proxy_url().unwrap_or_else(|| "disabled".to_string()),
            redact(&self.site.key)
        );
    }

    /// Proxy URL applied to both http and https traffic, if enabled
    pub fn proxy_url(&self) -> Option<String> {
        if !self.proxy.enable_proxy {
            return None;
        }
        Some(format!(
            "http://{}:{}",
            self.proxy.proxy_host.trim(),
            self.proxy.proxy_port
        ))
    }
}

/// Load, override from the environment, and validate a configuration file.
///
/// Any failure here is a startup error; the agent must not run with a
/// partially valid configuration.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let mut config = AgentConfig::from_yaml_file(path)?;
    config.apply_environment();
    config.validate()?;
    Ok(config)
}
