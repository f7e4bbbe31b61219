use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use dropzone_core::models::{PermissionPointReport, PermissionReport, UserReference};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PermissionReportQuery {
    /// Evaluate permissions for this user instead of the caller.
    pub user_id: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/permission-report/{parent_location_id}",
    tag = "permissions",
    params(
        ("parent_location_id" = u64, Path, description = "Location files would be dropped into"),
        PermissionReportQuery,
        ("X-Requested-With" = String, Header, description = "Must be XMLHttpRequest")
    ),
    responses(
        (status = 200, description = "Content types the user may create under the location", body = PermissionReport),
        (status = 400, description = "Not an AJAX request", body = ErrorResponse),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 502, description = "Permission check failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_permission_report(
    State(state): State<Arc<AppState>>,
    Path(parent_location_id): Path<u64>,
    Query(query): Query<PermissionReportQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let acting_user = query.user_id.map(|user_id| UserReference { user_id });

    let report = state
        .permissions
        .can_user_create_content(parent_location_id, acting_user.as_ref())
        .await?;

    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/v1/check-permission/{parent_location_id}/{content_type_id}",
    tag = "permissions",
    params(
        ("parent_location_id" = u64, Path, description = "Location files would be dropped into"),
        ("content_type_id" = u64, Path, description = "Content type to check"),
        ("X-Requested-With" = String, Header, description = "Must be XMLHttpRequest")
    ),
    responses(
        (status = 200, description = "Whether the caller may create the content type", body = PermissionPointReport),
        (status = 400, description = "Not an AJAX request", body = ErrorResponse),
        (status = 404, description = "Location or content type not found", body = ErrorResponse),
        (status = 502, description = "Permission check failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn check_permission(
    State(state): State<Arc<AppState>>,
    Path((parent_location_id, content_type_id)): Path<(u64, u64)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let report = state
        .permissions
        .check_point_permission(content_type_id, parent_location_id)
        .await?;

    Ok(Json(report))
}
