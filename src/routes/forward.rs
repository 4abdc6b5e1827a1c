use axum::{extract::State, Json};

use super::AppState;
use crate::error::GatewayError;
use crate::gateway::{HistoryRecord, NormalizedResponse, RequestDescription};

pub async fn forward_request(
    State(state): State<AppState>,
    Json(request): Json<RequestDescription>,
) -> Result<Json<NormalizedResponse>, GatewayError> {
    tracing::debug!(
        method = %request.method,
        target = %request.target_url,
        "forwarding request"
    );

    let response = state.gateway.forward(request.clone()).await?;

    if response.is_local_failure() {
        tracing::warn!(status_text = %response.status_text, "forward yielded a local failure");
    } else {
        tracing::debug!(status = response.status, "forward succeeded");
    }

    // Every completed forward is history-eligible, status-0 results included.
    state
        .history
        .record(HistoryRecord::capture(request, response.clone(), None));

    Ok(Json(response))
}
