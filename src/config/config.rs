// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service base URL, including the API version prefix
    pub catalog_api_url: String,

    /// Bearer token issued by the identity provider
    #[serde(default)]
    pub catalog_api_token: Option<String>,

    /// Per-request timeout for catalog fetches in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Local view API bind address (e.g., "127.0.0.1:8090")
    pub local_api_bind: SocketAddr,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BREW_CONFIG")
            .unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", config_path))?
        } else {
            Config::default()
        };

        if let Ok(val) = std::env::var("BREW_CATALOG_API_URL") {
            config.catalog_api_url = val;
        }
        if let Ok(val) = std::env::var("BREW_CATALOG_API_TOKEN") {
            config.catalog_api_token = Some(val);
        }
        if let Ok(val) = std::env::var("BREW_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = val.parse().context("Invalid BREW_REQUEST_TIMEOUT_SECS")?;
        }
        if let Ok(val) = std::env::var("BREW_LOCAL_API_BIND") {
            config.local_api_bind = SocketAddr::from_str(&val).context("Invalid BREW_LOCAL_API_BIND")?;
        }
        if let Ok(val) = std::env::var("BREW_LOG_LEVEL") {
            config.log_level = val;
        }
        if let Ok(val) = std::env::var("BREW_LOG_JSON") {
            config.log_json = val.parse().context("Invalid BREW_LOG_JSON")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the catalog client cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.catalog_api_url)
            .with_context(|| format!("Invalid catalog URL: {}", self.catalog_api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Catalog URL must use http or https, got {}", url.scheme());
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_api_url: String::from("http://localhost:8000/api/v1"),
            catalog_api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            local_api_bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8090),
            log_level: String::from("info"),
            log_json: false,
        }
    }
}
