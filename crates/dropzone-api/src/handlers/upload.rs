//! Multipart upload handler
//!
//! Every `file` part becomes one upload. Uploads of a batch run concurrently
//! and settle independently; a rejected or failed file is reported in its
//! outcome and never fails the request.
//!
//! The request timeout applies here as a deadline on the batch: uploads still
//! running when it passes are cancelled and reported as aborted.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use dropzone_core::models::{UploadFile, UploadOutcome};
use dropzone_core::AppError;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::constants::UPLOAD_FILE_FIELD;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatchResponse {
    pub parent_location_id: u64,
    pub container: String,
    /// One entry per file, in request order.
    pub outcomes: Vec<UploadOutcome>,
}

#[utoipa::path(
    post,
    path = "/api/v1/locations/{parent_location_id}/uploads",
    tag = "uploads",
    params(
        ("parent_location_id" = u64, Path, description = "Location the files are dropped into")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file upload outcomes", body = UploadBatchResponse),
        (status = 400, description = "Invalid multipart body or no files", body = ErrorResponse),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Path(parent_location_id): Path<u64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let timeout = Duration::from_secs(state.config.request_timeout_secs().max(1));
    let deadline = Instant::now() + timeout;

    let files = tokio::time::timeout_at(deadline, read_files(multipart))
        .await
        .map_err(|_| {
            AppError::BadRequest(format!(
                "Upload body not received within {} seconds",
                timeout.as_secs()
            ))
        })??;
    if files.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No '{}' parts in the request",
            UPLOAD_FILE_FIELD
        ))
        .into());
    }

    let target = state.upload_target(parent_location_id).await?;
    tracing::info!(
        container = %target.container_content_type,
        files = files.len(),
        "Starting upload batch"
    );

    let batch_cancel = state.shutdown.child_token();
    let deadline_timer = cancel_at(batch_cancel.clone(), deadline);
    let outcomes = state
        .uploads
        .upload_batch(&target, files, &batch_cancel, None)
        .await;
    deadline_timer.abort();

    Ok(Json(UploadBatchResponse {
        parent_location_id,
        container: target.container_content_type,
        outcomes,
    }))
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadFile>, HttpAppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FILE_FIELD) {
            continue;
        }

        let name = field
            .file_name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Every file part needs a file name".to_string()))?;
        let mime_type = field
            .content_type()
            .map(mime_essence)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let data = field.bytes().await?;

        files.push(UploadFile::new(name, mime_type, data));
    }

    Ok(files)
}

/// Cancel `token` once `deadline` passes.
fn cancel_at(token: CancellationToken, deadline: Instant) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep_until(deadline) => {
                tracing::warn!("Upload deadline passed, cancelling unfinished uploads");
                token.cancel();
            }
        }
    })
}

/// `type/subtype` without parameters, lowercased.
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_essence_strips_parameters() {
        assert_eq!(mime_essence("text/plain; charset=utf-8"), "text/plain");
        assert_eq!(mime_essence(" Image/PNG "), "image/png");
        assert_eq!(mime_essence(""), "");
    }

    #[tokio::test]
    async fn test_cancel_at_fires_after_deadline() {
        let token = CancellationToken::new();
        let timer = cancel_at(token.clone(), Instant::now() + Duration::from_millis(20));

        tokio::time::timeout(Duration::from_secs(5), token.cancelled())
            .await
            .expect("token cancelled at the deadline");
        timer.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_at_aborted_timer_leaves_token() {
        let token = CancellationToken::new();
        let timer = cancel_at(token.clone(), Instant::now() + Duration::from_millis(20));
        timer.abort();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!token.is_cancelled());
    }
}
