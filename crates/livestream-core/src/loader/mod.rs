mod http;

pub use http::HttpLoader;

use async_trait::async_trait;
use thiserror::Error;

use crate::status::LiveStatusResponse;

/// Every variant is the same "status query failed" condition for the poller;
/// the split only feeds logs and events.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error {status} fetching {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    #[error("Network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },
    #[error("Timeout fetching {url}")]
    Timeout { url: String },
}

impl LoadError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. }
            | Self::Network { url, .. }
            | Self::Parse { url, .. }
            | Self::Timeout { url } => url,
        }
    }
}

/// Trait for fetching the live status of all channels from a URL.
///
/// One call is one request; implementations do not retry. The trait is
/// object-safe and Send + Sync so a poller task can own it.
#[async_trait]
pub trait StatusLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<LiveStatusResponse, LoadError>;
}
