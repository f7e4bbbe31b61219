//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use dropzone_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dropzone API",
        version = "0.1.0",
        description = "Drag-and-drop uploads into a content tree: MIME type routing, create permission reports and per-file upload outcomes. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Configuration
        handlers::client_config::get_client_config,
        handlers::client_config::get_container_config,
        // Permissions
        handlers::permission_report::get_permission_report,
        handlers::permission_report::check_permission,
        // Uploads
        handlers::upload::upload_files,
        handlers::content_delete::delete_content,
    ),
    components(
        schemas(
            ErrorResponse,
            models::MappingConfiguration,
            models::LocationMapping,
            models::MimeTypeMapping,
            models::FallbackContentType,
            models::PermissionReport,
            models::PermissionPointReport,
            models::UploadOutcome,
            models::UploadStatus,
            models::FailureReason,
            models::Notification,
            models::NotificationState,
            models::PublishedContent,
            models::ContentInfo,
            models::ContentType,
            handlers::client_config::ContainerConfigResponse,
            handlers::upload::UploadBatchResponse,
        )
    ),
    tags(
        (name = "config", description = "Client configuration"),
        (name = "permissions", description = "Content create permission reports"),
        (name = "uploads", description = "File uploads")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
