use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::status::EmbeddedStatus;

/// Status endpoint that reports every known channel in one response.
pub const DEFAULT_ENDPOINT: &str = "https://api.poc.hujjat.org/youtube/live/";

pub const DEFAULT_CHANNELS: [&str; 3] = ["mainhall", "elc", "ladies"];

/// Gate applied to each channel's embedded `status_code` before its items
/// are inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCodeFilter {
    /// `code >= 200 || code <= 299`. Accepts every numeric code and an
    /// explicit `null`; rejects only a missing field.
    #[default]
    Permissive,
    /// `200 <= code <= 299`.
    Strict,
}

impl StatusCodeFilter {
    pub fn accepts(self, status_code: EmbeddedStatus) -> bool {
        match (self, status_code) {
            (_, EmbeddedStatus::Missing) => false,
            // null compares as 0, so `null <= 299` holds.
            (Self::Permissive, EmbeddedStatus::Null) => true,
            (Self::Permissive, EmbeddedStatus::Code(code)) => code >= 200.0 || code <= 299.0,
            (Self::Strict, EmbeddedStatus::Null) => false,
            (Self::Strict, EmbeddedStatus::Code(code)) => (200.0..=299.0).contains(&code),
        }
    }
}

/// Poll set used for the cycle after a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Carry the failed cycle's (empty) offline list forward.
    #[default]
    ClearPollSet,
    /// Retry the same poll set.
    KeepPollSet,
}

impl std::fmt::Display for StatusCodeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClearPollSet => write!(f, "clear_poll_set"),
            Self::KeepPollSet => write!(f, "keep_poll_set"),
        }
    }
}

/// Configuration for a status poller instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// URL queried on every cycle.
    pub endpoint: String,
    /// Initial poll set, in order.
    pub channels: Vec<String>,
    /// Delay between the end of one cycle and the start of the next (default: 60000ms).
    pub poll_interval: Duration,
    /// HTTP request timeout for status queries.
    pub request_timeout: Duration,
    pub status_filter: StatusCodeFilter,
    pub failure_policy: FailurePolicy,
    /// Maximum number of events to retain (ring buffer capacity).
    pub event_limit: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            channels: DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
            poll_interval: Duration::from_millis(60_000),
            request_timeout: Duration::from_secs(10),
            status_filter: StatusCodeFilter::default(),
            failure_policy: FailurePolicy::default(),
            event_limit: 200,
        }
    }
}

impl PollerConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval = Duration::from_millis(ms);
        self
    }

    pub fn with_request_timeout(mut self, ms: u64) -> Self {
        self.request_timeout = Duration::from_millis(ms);
        self
    }

    pub fn with_status_filter(mut self, filter: StatusCodeFilter) -> Self {
        self.status_filter = filter;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_event_limit(mut self, limit: usize) -> Self {
        self.event_limit = limit.max(1);
        self
    }
}
