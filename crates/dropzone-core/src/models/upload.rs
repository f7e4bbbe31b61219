use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::content::{ContentInfo, ContentType};
use crate::models::mapping::ResolvedMapping;

/// A file dropped onto a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    /// MIME type as reported by the client, without parameters.
    pub mime_type: String,
    pub size: u64,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            data,
        }
    }
}

/// Routing verdict for one upload attempt. Discarded once the attempt settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDecision {
    pub file: UploadFile,
    pub resolved_mapping: ResolvedMapping,
    pub size_allowed: bool,
    pub type_allowed: bool,
}

impl UploadDecision {
    pub fn is_allowed(&self) -> bool {
        self.size_allowed && self.type_allowed
    }
}

/// Why an upload ended in [`UploadState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    UnresolvedMimeType,
    TypeNotAllowed,
    SizeExceeded,
    UploadTransportFailed,
    PublishFailed,
    Internal,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::UnresolvedMimeType => "unresolved_mime_type",
            FailureReason::TypeNotAllowed => "type_not_allowed",
            FailureReason::SizeExceeded => "size_exceeded",
            FailureReason::UploadTransportFailed => "upload_transport_failed",
            FailureReason::PublishFailed => "publish_failed",
            FailureReason::Internal => "internal",
        }
    }
}

impl From<&AppError> for FailureReason {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::UnresolvedMimeType { .. } => FailureReason::UnresolvedMimeType,
            AppError::TypeNotAllowed { .. } => FailureReason::TypeNotAllowed,
            AppError::SizeExceeded { .. } => FailureReason::SizeExceeded,
            AppError::UploadTransportFailed { .. } => FailureReason::UploadTransportFailed,
            AppError::PublishFailed { .. } => FailureReason::PublishFailed,
            _ => FailureReason::Internal,
        }
    }
}

/// Lifecycle of a single upload.
///
/// `Detecting -> Validating -> Uploading -> Publishing -> Done`, with `Failed`
/// reachable from every non-terminal state and `Aborted` reachable until `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum UploadState {
    Detecting,
    Validating,
    Uploading,
    Publishing,
    Done,
    Failed(FailureReason),
    Aborted,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Done | UploadState::Failed(_) | UploadState::Aborted
        )
    }

    pub fn can_transition_to(&self, next: &UploadState) -> bool {
        use UploadState::*;

        match (self, next) {
            (Detecting, Validating)
            | (Validating, Uploading)
            | (Uploading, Publishing)
            | (Publishing, Done) => true,
            (current, Failed(_)) | (current, Aborted) => !current.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    Info,
    Done,
    Error,
}

/// A single human-readable message about one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub identifier: String,
    pub text: String,
    pub state: NotificationState,
}

impl Notification {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>, state: NotificationState) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.into(),
            state,
        }
    }
}

/// A state change of one upload, sent to progress listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub upload_id: Uuid,
    pub file_name: String,
    pub state: UploadState,
}

/// Published content reloaded after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedContent {
    pub content_info: ContentInfo,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Done,
    Failed,
    Aborted,
}

/// Final result of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub upload_id: Uuid,
    pub file_name: String,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Set once the content was created, even if reloading it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<PublishedContent>,
    pub notification: Notification,
}

impl UploadOutcome {
    pub fn done(
        upload_id: Uuid,
        file_name: String,
        content_id: u64,
        content: Option<PublishedContent>,
        notification: Notification,
    ) -> Self {
        Self {
            upload_id,
            file_name,
            status: UploadStatus::Done,
            reason: None,
            content_id: Some(content_id),
            content,
            notification,
        }
    }

    pub fn failed(upload_id: Uuid, file_name: String, reason: FailureReason, notification: Notification) -> Self {
        Self {
            upload_id,
            file_name,
            status: UploadStatus::Failed,
            reason: Some(reason),
            content_id: None,
            content: None,
            notification,
        }
    }

    pub fn aborted(upload_id: Uuid, file_name: String, notification: Notification) -> Self {
        Self {
            upload_id,
            file_name,
            status: UploadStatus::Aborted,
            reason: None,
            content_id: None,
            content: None,
            notification,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == UploadStatus::Done
    }
}
