use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use livestream_core::{Element, FailurePolicy, StatusCodeFilter, StatusEvent};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub poller_id: String,
    pub state: String,
    pub created_at: String,
    pub last_checked: Option<String>,
    pub last_success: Option<String>,
    pub cycles: u64,
    pub failures: u64,
    pub poll_interval_ms: u64,
    pub status_filter: StatusCodeFilter,
    pub failure_policy: FailurePolicy,
    pub poll_set: Vec<String>,
    pub channels: Vec<Element>,
}

#[derive(Serialize)]
pub struct ChannelsResponse {
    pub channels: Vec<Element>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub poller_id: String,
    pub events: Vec<StatusEvent>,
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let p = &state.poller;
    let stats = p.stats().await;

    Json(StatusResponse {
        poller_id: p.poller_id().to_string(),
        state: p.state().await.to_string(),
        created_at: p.created_at().to_rfc3339(),
        last_checked: stats.last_checked.map(|t| t.to_rfc3339()),
        last_success: stats.last_success.map(|t| t.to_rfc3339()),
        cycles: stats.cycles,
        failures: stats.failures,
        poll_interval_ms: p.config().poll_interval.as_millis() as u64,
        status_filter: p.config().status_filter,
        failure_policy: p.config().failure_policy,
        poll_set: stats.poll_set,
        channels: state.board.elements().await,
    })
}

/// GET /api/v1/channels
pub async fn list_channels(State(state): State<AppState>) -> Json<ChannelsResponse> {
    Json(ChannelsResponse {
        channels: state.board.elements().await,
    })
}

/// GET /api/v1/channels/:channel
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<Element>, ApiError> {
    state
        .board
        .element(&channel)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Channel '{}' not found", channel)))
}

/// GET /api/v1/events
pub async fn get_events(State(state): State<AppState>) -> Json<EventsResponse> {
    Json(EventsResponse {
        poller_id: state.poller.poller_id().to_string(),
        events: state.poller.get_events().await,
    })
}

/// DELETE /api/v1/events
pub async fn clear_events(State(state): State<AppState>) -> Json<MessageResponse> {
    state.poller.clear_events().await;
    Json(MessageResponse {
        message: "Events cleared".into(),
    })
}
