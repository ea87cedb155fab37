use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, log_enabled, Level};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::config::{redact, AgentConfig};
use crate::constants::{HTTP_TIMEOUT_SECS, LICENSE_KEY_HEADER};
use crate::error::SubmitError;
use crate::models::Report;
use crate::transport::Transport;

/// Longest response body kept in an error, in characters
const MAX_ERROR_BODY: usize = 512;

/// JSON-over-HTTPS transport with an optional forward proxy.
pub struct HttpsTransport {
    client: reqwest::Client,
    endpoint: String,
    license_key: String,
}

impl std::fmt::Debug for HttpsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpsTransport")
            .field("endpoint", &self.endpoint)
            .field("license_key", &redact(&self.license_key))
            .finish()
    }
}

impl HttpsTransport {
    /// Create a transport posting to `endpoint`.
    ///
    /// With `proxy` set every request goes through it; without, no proxy is
    /// used at all, including ones from the environment.
    pub fn new(endpoint: &str, license_key: &str, proxy: Option<&str>) -> Result<Self> {
        let timeout = Duration::from_secs(HTTP_TIMEOUT_SECS);
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        builder = match proxy {
            Some(url) => {
                info!("Configured to use proxy: {url}");
                builder.proxy(reqwest::Proxy::all(url).context(format!("Invalid proxy URL: {url}"))?)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            license_key: license_key.to_string(),
        })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::new(
            &config.plugin.endpoint,
            &config.site.key,
            config.proxy_url().as_deref(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpsTransport {
    async fn submit(&self, report: &Report) -> Result<(), SubmitError> {
        let body = serde_json::to_vec(report)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(LICENSE_KEY_HEADER, &self.license_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body.clone())
            .send()
            .await?;

        let status = response.status();
        if log_enabled!(Level::Debug) {
            debug!("{} ({})", self.endpoint, status.as_u16());
            debug!("{}", String::from_utf8_lossy(&body));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SubmitError::Http {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(())
    }
}
