pub mod channels;
pub mod widget;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(channels::get_status))
        .route("/channels", get(channels::list_channels))
        .route("/channels/{channel}", get(channels::get_channel))
        .route("/events", get(channels::get_events).delete(channels::clear_events))
}
