use std::fmt;

use crate::config::StatusCodeFilter;
use crate::status::{ChannelEntry, EmbeddedStatus, LiveStatusResponse};

use super::state::Visibility;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelUpdate {
    pub channel: String,
    pub visibility: Visibility,
    pub video_id: Option<String>,
}

/// Why a polled channel left the poll set without being marked.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    Absent,
    Malformed(String),
    StatusRejected(EmbeddedStatus),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent from response"),
            Self::Malformed(reason) => write!(f, "malformed entry: {}", reason),
            Self::StatusRejected(EmbeddedStatus::Missing) => write!(f, "missing status code"),
            Self::StatusRejected(code) => write!(f, "status code {} rejected", code),
        }
    }
}

/// Result of applying one successful response to a poll set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutcome {
    /// Markings to apply, in response order.
    pub updates: Vec<ChannelUpdate>,
    /// Channels marked offline, in response order.
    pub next_poll_set: Vec<String>,
    /// Polled channels that were neither marked online nor offline, in poll set order.
    pub dropped: Vec<(String, DropReason)>,
}

impl CycleOutcome {
    pub fn online(&self) -> impl Iterator<Item = &ChannelUpdate> {
        self.updates
            .iter()
            .filter(|u| u.visibility == Visibility::Online)
    }
}

/// Walk the response in body order and decide each polled channel's fate.
///
/// Keys not in `poll_set` are ignored. A channel with items goes online and
/// leaves the poll set for good; a channel with no items goes offline and is
/// polled again. Anything else is dropped.
pub fn reconcile(
    response: &LiveStatusResponse,
    poll_set: &[String],
    filter: StatusCodeFilter,
) -> CycleOutcome {
    let mut outcome = CycleOutcome::default();
    let mut rejected: Vec<(String, DropReason)> = Vec::new();

    for (channel, entry) in response.iter() {
        if !poll_set.iter().any(|c| c == channel) {
            continue;
        }

        let status = match entry {
            ChannelEntry::Valid(status) => status,
            ChannelEntry::Malformed(reason) => {
                rejected.push((channel.to_string(), DropReason::Malformed(reason.clone())));
                continue;
            }
        };

        if !filter.accepts(status.status_code) {
            rejected.push((
                channel.to_string(),
                DropReason::StatusRejected(status.status_code),
            ));
            continue;
        }

        if status.has_items() {
            outcome.updates.push(ChannelUpdate {
                channel: channel.to_string(),
                visibility: Visibility::Online,
                video_id: status.video_id().map(str::to_string),
            });
        } else {
            outcome.updates.push(ChannelUpdate {
                channel: channel.to_string(),
                visibility: Visibility::Offline,
                video_id: None,
            });
            outcome.next_poll_set.push(channel.to_string());
        }
    }

    for channel in poll_set {
        if outcome.updates.iter().any(|u| &u.channel == channel)
            || outcome.dropped.iter().any(|(c, _)| c == channel)
        {
            continue;
        }
        let reason = rejected
            .iter()
            .find(|(c, _)| c == channel)
            .map(|(_, r)| r.clone())
            .unwrap_or(DropReason::Absent);
        outcome.dropped.push((channel.clone(), reason));
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_set(channels: &[&str]) -> Vec<String> {
        channels.iter().map(|c| c.to_string()).collect()
    }

    fn response(body: &str) -> LiveStatusResponse {
        LiveStatusResponse::from_json(body).unwrap()
    }

    #[test]
    fn online_offline_and_absent() {
        let resp = response(
            r#"{
                "mainhall": {"status_code": 200, "result": {"items": [{"id": {"videoId": "abc"}}]}},
                "elc": {"status_code": 200, "result": {"items": []}}
            }"#,
        );
        let out = reconcile(
            &resp,
            &poll_set(&["mainhall", "elc", "ladies"]),
            StatusCodeFilter::Permissive,
        );

        assert_eq!(
            out.updates,
            vec![
                ChannelUpdate {
                    channel: "mainhall".into(),
                    visibility: Visibility::Online,
                    video_id: Some("abc".into()),
                },
                ChannelUpdate {
                    channel: "elc".into(),
                    visibility: Visibility::Offline,
                    video_id: None,
                },
            ]
        );
        assert_eq!(out.next_poll_set, vec!["elc"]);
        assert_eq!(out.dropped, vec![("ladies".to_string(), DropReason::Absent)]);
    }

    #[test]
    fn channels_outside_poll_set_are_ignored() {
        let resp = response(
            r#"{
                "mainhall": {"status_code": 200, "result": {"items": []}},
                "youth": {"status_code": 200, "result": {"items": []}}
            }"#,
        );
        let out = reconcile(&resp, &poll_set(&["mainhall"]), StatusCodeFilter::Permissive);
        assert_eq!(out.updates.len(), 1);
        assert_eq!(out.next_poll_set, vec!["mainhall"]);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn next_poll_set_follows_response_order() {
        let resp = response(
            r#"{
                "ladies": {"status_code": 200, "result": {"items": []}},
                "elc": {"status_code": 200, "result": {"items": []}},
                "mainhall": {"status_code": 200, "result": {"items": []}}
            }"#,
        );
        let out = reconcile(
            &resp,
            &poll_set(&["mainhall", "elc", "ladies"]),
            StatusCodeFilter::Permissive,
        );
        assert_eq!(out.next_poll_set, vec!["ladies", "elc", "mainhall"]);
    }

    #[test]
    fn permissive_gate_lets_error_codes_through() {
        let resp = response(
            r#"{
                "mainhall": {"status_code": 500, "result": {"items": []}},
                "elc": {"status_code": 403, "result": {"items": [{"id": {"videoId": "x"}}]}}
            }"#,
        );
        let out = reconcile(
            &resp,
            &poll_set(&["mainhall", "elc"]),
            StatusCodeFilter::Permissive,
        );
        assert_eq!(out.next_poll_set, vec!["mainhall"]);
        assert_eq!(out.online().count(), 1);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn strict_gate_drops_error_codes() {
        let resp = response(
            r#"{
                "mainhall": {"status_code": 500, "result": {"items": []}},
                "elc": {"status_code": 200, "result": {"items": []}}
            }"#,
        );
        let out = reconcile(&resp, &poll_set(&["mainhall", "elc"]), StatusCodeFilter::Strict);
        assert_eq!(out.next_poll_set, vec!["elc"]);
        assert_eq!(
            out.dropped,
            vec![("mainhall".to_string(), DropReason::StatusRejected(EmbeddedStatus::Code(500.0)))]
        );
    }

    #[test]
    fn null_and_float_codes() {
        let resp = response(
            r#"{
                "mainhall": {"status_code": null, "result": {"items": [{"id": {"videoId": "abc"}}]}},
                "elc": {"status_code": 200.0, "result": {"items": []}},
                "ladies": {"result": {"items": []}}
            }"#,
        );
        let polled = poll_set(&["mainhall", "elc", "ladies"]);

        let out = reconcile(&resp, &polled, StatusCodeFilter::Permissive);
        assert_eq!(out.online().count(), 1);
        assert_eq!(out.next_poll_set, vec!["elc"]);
        assert_eq!(
            out.dropped,
            vec![("ladies".to_string(), DropReason::StatusRejected(EmbeddedStatus::Missing))]
        );

        let out = reconcile(&resp, &polled, StatusCodeFilter::Strict);
        assert_eq!(out.next_poll_set, vec!["elc"]);
        assert_eq!(
            out.dropped,
            vec![
                ("mainhall".to_string(), DropReason::StatusRejected(EmbeddedStatus::Null)),
                ("ladies".to_string(), DropReason::StatusRejected(EmbeddedStatus::Missing)),
            ]
        );
        assert_eq!(
            out.dropped[0].1.to_string(),
            "status code null rejected"
        );
    }

    #[test]
    fn malformed_entry_is_dropped_rest_processed() {
        let resp = response(
            r#"{
                "mainhall": {"status_code": 200},
                "elc": {"status_code": 200, "result": {"items": []}}
            }"#,
        );
        let out = reconcile(
            &resp,
            &poll_set(&["mainhall", "elc"]),
            StatusCodeFilter::Permissive,
        );
        assert_eq!(out.next_poll_set, vec!["elc"]);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].0, "mainhall");
        assert!(matches!(out.dropped[0].1, DropReason::Malformed(_)));
    }

    #[test]
    fn empty_poll_set_marks_nothing() {
        let resp = response(r#"{"elc": {"status_code": 200, "result": {"items": []}}}"#);
        let out = reconcile(&resp, &[], StatusCodeFilter::Permissive);
        assert_eq!(out, CycleOutcome::default());
    }

    #[test]
    fn duplicate_poll_set_entries_report_once() {
        let resp = response("{}");
        let out = reconcile(
            &resp,
            &poll_set(&["elc", "elc"]),
            StatusCodeFilter::Permissive,
        );
        assert_eq!(out.dropped, vec![("elc".to_string(), DropReason::Absent)]);
    }
}
