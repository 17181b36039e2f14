//! TOML configuration file schema and parsing.
//!
//! Example config file:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//! log_format = "json"
//!
//! [poller]
//! endpoint = "https://api.poc.hujjat.org/youtube/live/"
//! channels = ["mainhall", "elc", "ladies"]
//! poll_interval_ms = 60000
//! status_filter = "permissive"
//! failure_policy = "clear_poll_set"
//!
//! [presentation]
//! element_prefix = "wp_hujjat_live_stream_"
//! online_class = "wp-hujjat-live-stream-online"
//! offline_class = "wp-hujjat-live-stream-offline"
//! ```

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use livestream_core::{
    ElementNaming, FailurePolicy, PollerConfig, StatusCodeFilter, DEFAULT_CHANNELS,
    DEFAULT_ENDPOINT,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub poller: PollerDef,

    #[serde(default)]
    pub presentation: ElementNaming,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            log_format: default_log_format(),
        }
    }
}

pub fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_log_format() -> String {
    "pretty".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerDef {
    pub id: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub status_filter: StatusCodeFilter,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default = "default_event_limit")]
    pub event_limit: usize,
}

impl Default for PollerDef {
    fn default() -> Self {
        Self {
            id: None,
            endpoint: default_endpoint(),
            channels: default_channels(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            status_filter: StatusCodeFilter::default(),
            failure_policy: FailurePolicy::default(),
            event_limit: default_event_limit(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

fn default_channels() -> Vec<String> {
    DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect()
}

fn default_poll_interval_ms() -> u64 {
    60_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_event_limit() -> usize {
    200
}

impl PollerDef {
    pub fn to_poller_config(&self) -> PollerConfig {
        PollerConfig::default()
            .with_endpoint(self.endpoint.clone())
            .with_channels(self.channels.iter().cloned())
            .with_poll_interval(self.poll_interval_ms)
            .with_request_timeout(self.request_timeout_ms)
            .with_status_filter(self.status_filter)
            .with_failure_policy(self.failure_policy)
            .with_event_limit(self.event_limit)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_poller(
            &self.poller.endpoint,
            &self.poller.channels,
            self.poller.poll_interval_ms,
        )?;

        if self.poller.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".into());
        }

        let naming = &self.presentation;
        if naming.online_class.trim().is_empty() || naming.offline_class.trim().is_empty() {
            return Err("online_class and offline_class must not be empty".into());
        }
        if naming.online_class == naming.offline_class {
            return Err(format!(
                "online_class and offline_class must differ (both '{}')",
                naming.online_class
            ));
        }

        match self.server.log_format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "Invalid log_format '{}': must be 'pretty' or 'json'",
                    other
                ));
            }
        }

        Ok(())
    }
}

/// Shared by the config file and the `watch` command line.
pub fn validate_poller(
    endpoint: &str,
    channels: &[String],
    poll_interval_ms: u64,
) -> Result<(), String> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| format!("Invalid endpoint URL: {} ({})", endpoint, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!("Endpoint must use http or https: {}", endpoint));
    }

    if channels.is_empty() {
        return Err("At least one channel is required".into());
    }
    let mut seen = HashSet::new();
    for channel in channels {
        if channel.trim().is_empty() {
            return Err("Channel names must not be empty".into());
        }
        if !seen.insert(channel.as_str()) {
            return Err(format!("Duplicate channel: {}", channel));
        }
    }

    if poll_interval_ms == 0 {
        return Err("poll_interval_ms must be greater than 0".into());
    }
    Ok(())
}
