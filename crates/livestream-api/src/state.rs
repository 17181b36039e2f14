use std::sync::Arc;

use livestream_core::{Poller, StatusBoard};

#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<Poller>,
    /// The sink the poller writes to; read-only from the API.
    pub board: Arc<StatusBoard>,
}

impl AppState {
    pub fn new(poller: Arc<Poller>, board: Arc<StatusBoard>) -> Self {
        Self { poller, board }
    }
}
