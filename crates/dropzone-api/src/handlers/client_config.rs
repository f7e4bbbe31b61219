//! Client configuration handlers
//!
//! The drop zone front end reads the normalized mapping tables to decide
//! which files to offer and how large they may be.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use dropzone_core::format_file_size;
use dropzone_core::mapping::{candidate_content_types, file_picker_filter};
use dropzone_core::models::MappingConfiguration;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Drop zone settings for containers of one content type.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfigResponse {
    pub container: String,
    /// File-picker hint, possibly with wildcards. Empty means no restriction.
    pub mime_type_filter: Vec<String>,
    pub candidate_content_types: BTreeSet<String>,
    pub max_file_size: u64,
    /// `max_file_size` rendered for display, e.g. "61.0 MB".
    pub max_file_size_text: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Normalized mapping configuration", body = MappingConfiguration),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_client_config(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(MappingConfiguration::clone(&state.mapping)))
}

#[utoipa::path(
    get,
    path = "/api/v1/config/containers/{container}",
    tag = "config",
    params(
        ("container" = String, Path, description = "Content type identifier of the container")
    ),
    responses(
        (status = 200, description = "Drop zone settings for the container", body = ContainerConfigResponse),
        (status = 400, description = "Invalid container identifier", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_container_config(
    State(state): State<Arc<AppState>>,
    Path(container): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let container = container.trim();
    if container.is_empty() {
        return Err(dropzone_core::AppError::BadRequest(
            "Container identifier must not be empty".to_string(),
        )
        .into());
    }

    let max_file_size = state.mapping.max_file_size();
    Ok(Json(ContainerConfigResponse {
        container: container.to_string(),
        mime_type_filter: file_picker_filter(&state.mapping, container).to_vec(),
        candidate_content_types: candidate_content_types(&state.mapping, container),
        max_file_size,
        max_file_size_text: format_file_size(max_file_size),
    }))
}
