use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ChannelOnline,
    ChannelOffline,
    ChannelDropped,
    QueryFailed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelOnline => write!(f, "ONLINE"),
            Self::ChannelOffline => write!(f, "OFFLINE"),
            Self::ChannelDropped => write!(f, "DROPPED"),
            Self::QueryFailed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub details: String,
}

impl StatusEvent {
    pub fn new(kind: EventKind, channel: Option<&str>, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            channel: channel.map(str::to_string),
            details: details.into(),
        }
    }
}

/// Fixed-capacity circular buffer for recent events. O(1) insert, evicts oldest when full.
#[derive(Debug, Clone)]
pub struct EventRing {
    buffer: VecDeque<StatusEvent>,
    capacity: usize,
}

impl EventRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: StatusEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    /// Newest first.
    pub fn list(&self) -> Vec<StatusEvent> {
        self.buffer.iter().rev().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(kind: EventKind, detail: &str) -> StatusEvent {
        StatusEvent::new(kind, Some("mainhall"), detail)
    }

    #[test]
    fn ring_push_and_list() {
        let mut ring = EventRing::new(5);
        ring.push(make_event(EventKind::ChannelOffline, "first"));
        ring.push(make_event(EventKind::ChannelOnline, "second"));
        assert_eq!(ring.len(), 2);

        let events = ring.list();
        assert_eq!(events[0].kind, EventKind::ChannelOnline);
        assert_eq!(events[1].kind, EventKind::ChannelOffline);
    }

    #[test]
    fn ring_evicts_oldest() {
        let mut ring = EventRing::new(2);
        ring.push(make_event(EventKind::ChannelOffline, "e1"));
        ring.push(make_event(EventKind::ChannelOnline, "e2"));
        ring.push(make_event(EventKind::QueryFailed, "e3"));
        assert_eq!(ring.len(), 2);
        let events = ring.list();
        assert_eq!(events[0].details, "e3");
        assert_eq!(events[1].details, "e2");
    }

    #[test]
    fn ring_clear() {
        let mut ring = EventRing::new(5);
        ring.push(make_event(EventKind::ChannelOnline, "e1"));
        ring.clear();
        assert!(ring.is_empty());
    }

    #[test]
    fn event_without_channel_omits_field() {
        let ev = StatusEvent::new(EventKind::QueryFailed, None, "timeout");
        let json = serde_json::to_value(&ev).unwrap();
        assert!(json.get("channel").is_none());
        assert_eq!(json["kind"], "query_failed");
    }

    #[test]
    fn event_display() {
        assert_eq!(EventKind::ChannelOnline.to_string(), "ONLINE");
        assert_eq!(EventKind::ChannelOffline.to_string(), "OFFLINE");
        assert_eq!(EventKind::QueryFailed.to_string(), "FAILED");
    }
}
