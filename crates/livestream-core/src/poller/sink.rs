use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::state::Visibility;

/// Where per-channel visibility is rendered.
///
/// Implementations must leave exactly one of the two states applied to the
/// channel after each call.
#[async_trait]
pub trait VisibilitySink: Send + Sync {
    async fn set_visibility(&self, channel: &str, visibility: Visibility);
}

/// Sink that only remembers the calls it received, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<(String, Visibility)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<(String, Visibility)> {
        self.calls.lock().await.clone()
    }

    /// Last visibility recorded for `channel`.
    pub async fn last(&self, channel: &str) -> Option<Visibility> {
        self.calls
            .lock()
            .await
            .iter()
            .rev()
            .find(|(c, _)| c == channel)
            .map(|(_, v)| *v)
    }

    pub async fn clear(&self) {
        self.calls.lock().await.clear();
    }
}

#[async_trait]
impl VisibilitySink for RecordingSink {
    async fn set_visibility(&self, channel: &str, visibility: Visibility) {
        self.calls.lock().await.push((channel.to_string(), visibility));
    }
}
