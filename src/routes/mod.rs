pub mod forward;
pub mod health;

use crate::gateway::{Gateway, HistoryStore};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared handler state: the gateway plus the history collaborator.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub history: Arc<dyn HistoryStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/forward", post(forward::forward_request))
        .with_state(state)
}
