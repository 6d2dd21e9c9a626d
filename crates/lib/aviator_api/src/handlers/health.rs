//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health`: liveness plus a credential store ping.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("credential store ping failed: {e}");
            false
        }
    };

    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: Utc::now(),
        store_connected,
        version: aviator_core::version().into(),
    })
}
