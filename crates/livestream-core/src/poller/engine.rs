use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{FailurePolicy, PollerConfig};
use crate::loader::StatusLoader;
use crate::poller::event::{EventKind, EventRing, StatusEvent};
use crate::poller::reconcile::{reconcile, ChannelUpdate, DropReason};
use crate::poller::sink::VisibilitySink;
use crate::poller::state::{PollerState, PollerStats, Visibility};

/// Tag carried by every poller log line.
pub const LOG_TARGET: &str = "wp_hujjat_live_stream";

pub struct Poller {
    poller_id: String,
    config: PollerConfig,
    loader: Arc<dyn StatusLoader>,
    sink: Arc<dyn VisibilitySink>,
    state: Arc<RwLock<PollerState>>,
    /// `true` asks the running loop to stop. Reset on every `start`.
    stop_tx: watch::Sender<bool>,
    events: Arc<RwLock<EventRing>>,
    stats: Arc<RwLock<PollerStats>>,
    last_visibility: Arc<RwLock<HashMap<String, Visibility>>>,
    created_at: DateTime<Utc>,
}

impl Poller {
    pub fn new(
        config: PollerConfig,
        loader: Arc<dyn StatusLoader>,
        sink: Arc<dyn VisibilitySink>,
    ) -> Self {
        let id = Uuid::new_v4();
        let stats = PollerStats {
            poll_set: config.channels.clone(),
            ..PollerStats::default()
        };
        Self {
            poller_id: id.to_string(),
            events: Arc::new(RwLock::new(EventRing::new(config.event_limit))),
            config,
            loader,
            sink,
            state: Arc::new(RwLock::new(PollerState::Idle)),
            stop_tx: watch::channel(false).0,
            stats: Arc::new(RwLock::new(stats)),
            last_visibility: Arc::new(RwLock::new(HashMap::new())),
            created_at: Utc::now(),
        }
    }

    pub fn with_poller_id(mut self, poller_id: impl Into<String>) -> Self {
        self.poller_id = poller_id.into();
        self
    }

    pub fn poller_id(&self) -> &str {
        &self.poller_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub async fn state(&self) -> PollerState {
        *self.state.read().await
    }

    pub async fn stats(&self) -> PollerStats {
        self.stats.read().await.clone()
    }

    /// Poll set the next cycle will use.
    pub async fn poll_set(&self) -> Vec<String> {
        self.stats.read().await.poll_set.clone()
    }

    /// Newest first.
    pub async fn get_events(&self) -> Vec<StatusEvent> {
        self.events.read().await.list()
    }

    pub async fn clear_events(&self) {
        self.events.write().await.clear();
    }

    /// Last visibility this poller applied to `channel`.
    pub async fn visibility(&self, channel: &str) -> Option<Visibility> {
        self.last_visibility.read().await.get(channel).copied()
    }

    /// Spawn the polling loop. The first cycle runs immediately; each later
    /// cycle starts one poll interval after the previous one finished.
    pub async fn start(&self) -> Result<(), String> {
        if self.config.poll_interval.is_zero() {
            return Err("Poll interval must be greater than zero".into());
        }
        {
            let mut state = self.state.write().await;
            if *state == PollerState::Active {
                return Ok(());
            }
            if !state.can_transition_to(PollerState::Active) {
                return Err(format!("Cannot start poller while {}; try again shortly", state));
            }
            *state = PollerState::Active;
            // Under the state lock so a concurrent `stop` cannot be lost or
            // leak into this run.
            self.stop_tx.send_replace(false);
        }
        let mut stop_rx = self.stop_tx.subscribe();

        info!(poller_id = %self.poller_id, channels = ?self.config.channels, "Starting poller");

        let ctx = self.cycle_context();
        let state = Arc::clone(&self.state);
        let interval = self.config.poll_interval;
        let mut poll_set = self.config.channels.clone();
        ctx.stats.write().await.poll_set = poll_set.clone();

        tokio::spawn(async move {
            loop {
                if *state.read().await != PollerState::Active {
                    break;
                }

                poll_set = ctx.run_cycle(poll_set).await;

                // Resolves on a stop request or when the poller is dropped.
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = stop_rx.wait_for(|stop| *stop) => break,
                }
            }
            *state.write().await = PollerState::Stopped;
            info!("Poller stopped");
        });

        Ok(())
    }

    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if *state == PollerState::Active {
            *state = PollerState::Stopping;
            self.stop_tx.send_replace(true);
            info!(poller_id = %self.poller_id, "Stopping poller");
        }
    }

    /// Run one cycle against `poll_set` and return the poll set for the next one.
    pub async fn poll_once(&self, poll_set: Vec<String>) -> Vec<String> {
        self.cycle_context().run_cycle(poll_set).await
    }

    fn cycle_context(&self) -> CycleContext {
        CycleContext {
            config: self.config.clone(),
            loader: Arc::clone(&self.loader),
            sink: Arc::clone(&self.sink),
            events: Arc::clone(&self.events),
            stats: Arc::clone(&self.stats),
            last_visibility: Arc::clone(&self.last_visibility),
        }
    }
}

struct CycleContext {
    config: PollerConfig,
    loader: Arc<dyn StatusLoader>,
    sink: Arc<dyn VisibilitySink>,
    events: Arc<RwLock<EventRing>>,
    stats: Arc<RwLock<PollerStats>>,
    last_visibility: Arc<RwLock<HashMap<String, Visibility>>>,
}

impl CycleContext {
    async fn run_cycle(&self, poll_set: Vec<String>) -> Vec<String> {
        let checked_at = Utc::now();
        info!(target: LOG_TARGET, channels = ?poll_set, "Starting scan");

        let next = match self.loader.load(&self.config.endpoint).await {
            Ok(response) => {
                debug!(target: LOG_TARGET, entries = response.len(), "Going through the channels");
                let outcome = reconcile(&response, &poll_set, self.config.status_filter);

                for update in &outcome.updates {
                    self.apply(update).await;
                }
                for (channel, reason) in &outcome.dropped {
                    self.drop_channel(channel, reason).await;
                }

                self.stats.write().await.last_success = Some(checked_at);
                outcome.next_poll_set
            }
            Err(e) => {
                warn!(target: LOG_TARGET, error = %e, "Failure querying live status");
                self.record(StatusEvent::new(EventKind::QueryFailed, None, e.to_string()))
                    .await;
                self.stats.write().await.failures += 1;
                match self.config.failure_policy {
                    FailurePolicy::ClearPollSet => Vec::new(),
                    FailurePolicy::KeepPollSet => poll_set,
                }
            }
        };

        if next.is_empty() {
            debug!(target: LOG_TARGET, "Nothing left to poll");
        }

        let mut stats = self.stats.write().await;
        stats.cycles += 1;
        stats.last_checked = Some(checked_at);
        stats.poll_set = next.clone();
        next
    }

    async fn apply(&self, update: &ChannelUpdate) {
        let channel = update.channel.as_str();
        match update.visibility {
            Visibility::Online => info!(
                target: LOG_TARGET,
                channel,
                video_id = update.video_id.as_deref().unwrap_or(""),
                "Live stream is online"
            ),
            Visibility::Offline => info!(target: LOG_TARGET, channel, "Live stream is offline"),
        }

        self.sink.set_visibility(channel, update.visibility).await;

        let previous = self
            .last_visibility
            .write()
            .await
            .insert(channel.to_string(), update.visibility);
        if previous == Some(update.visibility) {
            return;
        }

        let event = match update.visibility {
            Visibility::Online => StatusEvent::new(
                EventKind::ChannelOnline,
                Some(channel),
                match update.video_id {
                    Some(ref video_id) => format!("Live stream is online (video {})", video_id),
                    None => "Live stream is online".to_string(),
                },
            ),
            Visibility::Offline => StatusEvent::new(
                EventKind::ChannelOffline,
                Some(channel),
                "Live stream is offline",
            ),
        };
        self.record(event).await;
    }

    async fn drop_channel(&self, channel: &str, reason: &DropReason) {
        match reason {
            DropReason::Malformed(_) => {
                warn!(target: LOG_TARGET, channel, %reason, "Channel dropped from polling")
            }
            _ => debug!(target: LOG_TARGET, channel, %reason, "Channel dropped from polling"),
        }
        self.record(StatusEvent::new(
            EventKind::ChannelDropped,
            Some(channel),
            reason.to_string(),
        ))
        .await;
    }

    async fn record(&self, event: StatusEvent) {
        self.events.write().await.push(event);
    }
}
