use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use dropzone_core::models::Notification;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteContentQuery {
    /// Name shown in the notification; defaults to the content id.
    pub file_name: Option<String>,
}

#[utoipa::path(
    delete,
    path = "/api/v1/contents/{content_id}",
    tag = "uploads",
    params(
        ("content_id" = u64, Path, description = "Content created by an upload"),
        DeleteContentQuery
    ),
    responses(
        (status = 200, description = "Content deleted", body = Notification),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<u64>,
    Query(query): Query<DeleteContentQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let file_name = query
        .file_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| content_id.to_string());

    let notification = state.uploads.delete_uploaded(content_id, &file_name).await?;

    Ok(Json(notification))
}
