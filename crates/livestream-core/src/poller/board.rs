//! In-memory stand-in for the page elements the widget styles.
//!
//! Each configured channel owns one [`Element`] whose id is derived from the
//! channel name. Marking a channel removes the opposite class before adding
//! the current one, so the two classes are never present together.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::engine::LOG_TARGET;
use super::sink::VisibilitySink;
use super::state::Visibility;

/// Element id prefix and the two presentation classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementNaming {
    pub element_prefix: String,
    pub online_class: String,
    pub offline_class: String,
}

impl Default for ElementNaming {
    fn default() -> Self {
        Self {
            element_prefix: "wp_hujjat_live_stream_".into(),
            online_class: "wp-hujjat-live-stream-online".into(),
            offline_class: "wp-hujjat-live-stream-offline".into(),
        }
    }
}

impl ElementNaming {
    pub fn element_id(&self, channel: &str) -> String {
        format!("{}{}", self.element_prefix, channel)
    }

    pub fn class_for(&self, visibility: Visibility) -> &str {
        match visibility {
            Visibility::Online => &self.online_class,
            Visibility::Offline => &self.offline_class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub channel: String,
    /// Class list in insertion order.
    pub classes: Vec<String>,
    /// Derived from `classes`; `None` until the channel is first marked.
    pub visibility: Option<Visibility>,
}

impl Element {
    fn new(id: String, channel: String) -> Self {
        Self {
            id,
            channel,
            classes: Vec::new(),
            visibility: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

#[derive(Debug)]
pub struct StatusBoard {
    naming: ElementNaming,
    order: Vec<String>,
    elements: RwLock<BTreeMap<String, Element>>,
}

impl StatusBoard {
    pub fn new<I, S>(naming: ElementNaming, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Vec::new();
        let mut elements = BTreeMap::new();
        for channel in channels {
            let channel = channel.into();
            if elements.contains_key(&channel) {
                continue;
            }
            let element = Element::new(naming.element_id(&channel), channel.clone());
            elements.insert(channel.clone(), element);
            order.push(channel);
        }
        Self {
            naming,
            order,
            elements: RwLock::new(elements),
        }
    }

    pub fn naming(&self) -> &ElementNaming {
        &self.naming
    }

    /// Elements in configured channel order.
    pub async fn elements(&self) -> Vec<Element> {
        let elements = self.elements.read().await;
        self.order
            .iter()
            .filter_map(|c| elements.get(c).cloned())
            .collect()
    }

    pub async fn element(&self, channel: &str) -> Option<Element> {
        self.elements.read().await.get(channel).cloned()
    }

    pub async fn visibility(&self, channel: &str) -> Option<Visibility> {
        self.elements
            .read()
            .await
            .get(channel)
            .and_then(|e| e.visibility)
    }
}

#[async_trait]
impl VisibilitySink for StatusBoard {
    async fn set_visibility(&self, channel: &str, visibility: Visibility) {
        let mut elements = self.elements.write().await;
        let Some(element) = elements.get_mut(channel) else {
            debug!(target: LOG_TARGET, channel, "No element for channel");
            return;
        };
        element.remove_class(self.naming.class_for(visibility.opposite()));
        element.add_class(self.naming.class_for(visibility));
        element.visibility = Some(visibility);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> StatusBoard {
        StatusBoard::new(ElementNaming::default(), ["mainhall", "elc", "ladies"])
    }

    #[test]
    fn element_ids_follow_prefix() {
        let naming = ElementNaming::default();
        assert_eq!(naming.element_id("mainhall"), "wp_hujjat_live_stream_mainhall");
        assert_eq!(naming.class_for(Visibility::Online), "wp-hujjat-live-stream-online");
        assert_eq!(naming.class_for(Visibility::Offline), "wp-hujjat-live-stream-offline");
    }

    #[tokio::test]
    async fn elements_start_unmarked_in_order() {
        let b = board();
        let elements = b.elements().await;
        let channels: Vec<&str> = elements.iter().map(|e| e.channel.as_str()).collect();
        assert_eq!(channels, vec!["mainhall", "elc", "ladies"]);
        assert!(elements.iter().all(|e| e.classes.is_empty() && e.visibility.is_none()));
    }

    #[tokio::test]
    async fn marking_keeps_classes_exclusive() {
        let b = board();
        b.set_visibility("elc", Visibility::Offline).await;
        b.set_visibility("elc", Visibility::Offline).await;
        let e = b.element("elc").await.unwrap();
        assert_eq!(e.classes, vec!["wp-hujjat-live-stream-offline"]);

        b.set_visibility("elc", Visibility::Online).await;
        let e = b.element("elc").await.unwrap();
        assert_eq!(e.classes, vec!["wp-hujjat-live-stream-online"]);
        assert!(!e.has_class("wp-hujjat-live-stream-offline"));
        assert_eq!(b.visibility("elc").await, Some(Visibility::Online));
    }

    #[tokio::test]
    async fn unknown_channel_is_ignored() {
        let b = board();
        b.set_visibility("youth", Visibility::Online).await;
        assert!(b.element("youth").await.is_none());
        assert_eq!(b.elements().await.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_channels_collapse() {
        let b = StatusBoard::new(ElementNaming::default(), ["elc", "elc", "ladies"]);
        assert_eq!(b.elements().await.len(), 2);
    }

    #[tokio::test]
    async fn custom_naming() {
        let naming = ElementNaming {
            element_prefix: "live-".into(),
            online_class: "on".into(),
            offline_class: "off".into(),
        };
        let b = StatusBoard::new(naming, ["a"]);
        b.set_visibility("a", Visibility::Online).await;
        let e = b.element("a").await.unwrap();
        assert_eq!(e.id, "live-a");
        assert_eq!(e.classes, vec!["on"]);
    }
}
