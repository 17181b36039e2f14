//! Wire model for the live status endpoint.
//!
//! The endpoint returns one JSON object keyed by channel identifier:
//!
//! ```json
//! {
//!   "mainhall": { "status_code": 200, "result": { "items": [ { "id": { "videoId": "abc" } } ] } },
//!   "elc":      { "status_code": 200, "result": { "items": [] } }
//! }
//! ```
//!
//! Key order is preserved. A body that is not a JSON object is a parse error.
//! Individual entries that do not match [`ChannelStatus`] are kept as
//! [`ChannelEntry::Malformed`] so the rest of the response is still usable.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The `status_code` field of one channel entry.
///
/// A missing field and an explicit `null` are distinct: the permissive gate
/// rejects the first and accepts the second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EmbeddedStatus {
    #[default]
    Missing,
    Null,
    Code(f64),
}

impl<'de> Deserialize<'de> for EmbeddedStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(code) => Self::Code(code),
            None => Self::Null,
        })
    }
}

impl Serialize for EmbeddedStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing | Self::Null => serializer.serialize_none(),
            Self::Code(code) => serializer.serialize_f64(*code),
        }
    }
}

impl fmt::Display for EmbeddedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Null => write!(f, "null"),
            Self::Code(code) => write!(f, "{}", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatus {
    #[serde(default)]
    pub status_code: EmbeddedStatus,
    pub result: SearchResult,
}

impl ChannelStatus {
    pub fn has_items(&self) -> bool {
        !self.result.items.is_empty()
    }

    /// Video id of the first item, if it has one.
    pub fn video_id(&self) -> Option<&str> {
        self.result
            .items
            .first()
            .and_then(|item| item.id.as_ref())
            .and_then(|id| id.video_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: Option<ItemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemId {
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEntry {
    Valid(ChannelStatus),
    Malformed(String),
}

/// A parsed response, in body order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStatusResponse {
    entries: Vec<(String, ChannelEntry)>,
}

impl LiveStatusResponse {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(map) = value else {
            return Err(serde_json::Error::custom(
                "expected a JSON object keyed by channel",
            ));
        };

        let entries = map
            .into_iter()
            .map(|(channel, v)| {
                let entry = match serde_json::from_value::<ChannelStatus>(v) {
                    Ok(status) => ChannelEntry::Valid(status),
                    Err(e) => ChannelEntry::Malformed(e.to_string()),
                };
                (channel, entry)
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, channel: &str) -> Option<&ChannelEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == channel)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
