use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    Idle,
    Active,
    Stopping,
    Stopped,
}

impl PollerState {
    pub fn can_transition_to(self, target: PollerState) -> bool {
        matches!(
            (self, target),
            (PollerState::Idle, PollerState::Active)
                | (PollerState::Active, PollerState::Stopping)
                | (PollerState::Stopping, PollerState::Stopped)
                | (PollerState::Stopped, PollerState::Active)
        )
    }
}

impl std::fmt::Display for PollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Last-known broadcast state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Online,
    Offline,
}

impl Visibility {
    pub fn opposite(self) -> Visibility {
        match self {
            Self::Online => Self::Offline,
            Self::Offline => Self::Online,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Counters and timestamps for display. Never read back by the loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollerStats {
    pub cycles: u64,
    pub failures: u64,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    /// Poll set the next cycle will use.
    pub poll_set: Vec<String>,
}
