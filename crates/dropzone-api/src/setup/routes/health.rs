//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub environment: String,
    pub location_mappings: usize,
    pub default_mappings: usize,
    pub fallback_configured: bool,
    pub max_file_size: u64,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Reports the loaded mapping tables. The mapping is validated at startup, so
/// a running process is always healthy.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mapping = &state.mapping;
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        environment: state.config.environment().to_string(),
        location_mappings: mapping.location_mappings().len(),
        default_mappings: mapping.default_mappings().len(),
        fallback_configured: mapping.fallback_content_type().is_configured(),
        max_file_size: mapping.max_file_size(),
    })
}
