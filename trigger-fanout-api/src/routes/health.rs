/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "resource_store": "connected"
/// }
/// ```
use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use trigger_fanout_shared::contracts::DbType;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Resource store connectivity
    pub resource_store: String,
}

/// Health check handler. Reports the resource store reachable if a listing
/// call against the plugin table succeeds, regardless of whether any
/// plugins are actually registered.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let resource_store_status = match state.resource_store.get_all_keys("Plugin", DbType::OnDisk).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(HealthResponse {
        status: if resource_store_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        resource_store: resource_store_status.to_string(),
    })
}
