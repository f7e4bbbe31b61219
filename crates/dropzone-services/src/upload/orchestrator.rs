//! Upload orchestration
//!
//! Each dropped file runs through its own state machine:
//! `Detecting -> Validating -> Uploading -> Publishing -> Done`, ending in
//! `Failed` or `Aborted` otherwise. Files share nothing but the read-only
//! mapping configuration and the host collaborators.

use std::sync::Arc;

use dropzone_core::format::{aborted_text, deleted_text, published_text};
use dropzone_core::mapping::is_type_allowed;
use dropzone_core::models::{
    ContentCreateRequest, ContentHandle, FailureReason, FieldPayload, FieldValue,
    MappingConfiguration, Notification, NotificationState, PublishedContent, UploadDecision,
    UploadFile, UploadOutcome, UploadProgress, UploadState,
};
use dropzone_core::{
    resolve_mapping, AppError, ContentRepository, ContentTypeLookup, ErrorMetadata, LogLevel,
};
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Container the files are dropped into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub parent_location_id: u64,
    /// Content type identifier of the content at `parent_location_id`.
    pub container_content_type: String,
}

/// Tracks the state of one upload and reports every transition.
struct UploadTracker<'a> {
    upload_id: Uuid,
    file_name: &'a str,
    state: UploadState,
    progress: Option<&'a mpsc::Sender<UploadProgress>>,
}

impl<'a> UploadTracker<'a> {
    async fn start(
        upload_id: Uuid,
        file_name: &'a str,
        progress: Option<&'a mpsc::Sender<UploadProgress>>,
    ) -> UploadTracker<'a> {
        let tracker = Self {
            upload_id,
            file_name,
            state: UploadState::Detecting,
            progress,
        };
        tracker.report().await;
        tracker
    }

    async fn advance(&mut self, next: UploadState) -> Result<(), AppError> {
        if !self.state.can_transition_to(&next) {
            return Err(AppError::Internal(format!(
                "Invalid upload transition {:?} -> {:?}",
                self.state, next
            )));
        }
        self.state = next;
        self.report().await;
        Ok(())
    }

    async fn report(&self) {
        tracing::debug!(
            upload_id = %self.upload_id,
            file_name = %self.file_name,
            state = ?self.state,
            "Upload state changed"
        );

        if let Some(progress) = self.progress {
            let event = UploadProgress {
                upload_id: self.upload_id,
                file_name: self.file_name.to_string(),
                state: self.state,
            };
            if progress.send(event).await.is_err() {
                tracing::debug!(upload_id = %self.upload_id, "Progress receiver dropped");
            }
        }
    }
}

/// Routes, validates, creates and publishes dropped files.
#[derive(Clone)]
pub struct UploadOrchestrator {
    config: Arc<MappingConfiguration>,
    content_types: Arc<dyn ContentTypeLookup>,
    repository: Arc<dyn ContentRepository>,
}

impl UploadOrchestrator {
    pub fn new(
        config: Arc<MappingConfiguration>,
        content_types: Arc<dyn ContentTypeLookup>,
        repository: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            config,
            content_types,
            repository,
        }
    }

    pub fn config(&self) -> &MappingConfiguration {
        &self.config
    }

    /// Routing and validation verdict for a file, without touching the host.
    pub fn decide(&self, container: &str, file: &UploadFile) -> Result<UploadDecision, AppError> {
        let resolved_mapping = resolve_mapping(&self.config, container, &file.mime_type)?;

        Ok(UploadDecision {
            file: file.clone(),
            resolved_mapping,
            size_allowed: file.size <= self.config.max_file_size(),
            type_allowed: is_type_allowed(&self.config, container, &file.mime_type),
        })
    }

    /// Create request for an accepted file: the binary goes into the resolved
    /// content field and the file name into the name field.
    pub fn build_create_request(
        &self,
        decision: &UploadDecision,
        parent_location_id: u64,
    ) -> ContentCreateRequest {
        let mapping = &decision.resolved_mapping;

        ContentCreateRequest {
            content_type_identifier: mapping.content_type_identifier.clone(),
            parent_location_id,
            fields: vec![
                FieldValue {
                    field_identifier: mapping.name_field().to_string(),
                    payload: FieldPayload::Text(decision.file.name.clone()),
                },
                FieldValue {
                    field_identifier: mapping.content_field_identifier.clone(),
                    payload: FieldPayload::Binary {
                        file_name: decision.file.name.clone(),
                        data: decision.file.data.clone(),
                    },
                },
            ],
        }
    }

    /// Run one upload to completion, failure or cancellation.
    ///
    /// Cancelling `cancel` aborts the upload until the host confirms the
    /// publish; after that the upload completes as `Done`. Content the host
    /// already acknowledged is not cleaned up.
    #[tracing::instrument(
        skip(self, target, file, cancel, progress),
        fields(
            upload_id = %upload_id,
            file_name = %file.name,
            mime_type = %file.mime_type,
            container = %target.container_content_type,
        )
    )]
    pub async fn upload(
        &self,
        target: &UploadTarget,
        file: UploadFile,
        upload_id: Uuid,
        cancel: CancellationToken,
        progress: Option<&mpsc::Sender<UploadProgress>>,
    ) -> UploadOutcome {
        let mut tracker = UploadTracker::start(upload_id, &file.name, progress).await;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.drive(target, &file, &mut tracker) => Some(result),
        };

        match result {
            Some(Ok(handle)) => {
                if let Err(e) = tracker.advance(UploadState::Done).await {
                    tracing::error!(error = %e, "Failed to record upload completion");
                }
                let content = self.reload(&handle).await;
                tracing::info!(content_id = handle.content_id, "File uploaded and published");
                UploadOutcome::done(
                    upload_id,
                    file.name.clone(),
                    handle.content_id,
                    content,
                    Notification::new(
                        format!("upload-published-{}", upload_id),
                        published_text(&file.name),
                        NotificationState::Done,
                    ),
                )
            }
            Some(Err(err)) => {
                let reason = FailureReason::from(&err);
                log_upload_error(&err);
                if let Err(e) = tracker.advance(UploadState::Failed(reason)).await {
                    tracing::error!(error = %e, "Failed to record upload failure");
                }
                UploadOutcome::failed(
                    upload_id,
                    file.name.clone(),
                    reason,
                    Notification::new(
                        format!("upload-failed-{}", upload_id),
                        err.client_message(),
                        NotificationState::Error,
                    ),
                )
            }
            None => {
                tracing::info!(state = ?tracker.state, "Upload aborted");
                if let Err(e) = tracker.advance(UploadState::Aborted).await {
                    tracing::error!(error = %e, "Failed to record upload abort");
                }
                UploadOutcome::aborted(
                    upload_id,
                    file.name.clone(),
                    Notification::new(
                        format!("upload-aborted-{}", upload_id),
                        aborted_text(&file.name),
                        NotificationState::Info,
                    ),
                )
            }
        }
    }

    async fn drive(
        &self,
        target: &UploadTarget,
        file: &UploadFile,
        tracker: &mut UploadTracker<'_>,
    ) -> Result<ContentHandle, AppError> {
        let container = target.container_content_type.as_str();
        let decision = self.decide(container, file)?;

        tracker.advance(UploadState::Validating).await?;
        if !decision.type_allowed {
            return Err(AppError::TypeNotAllowed {
                file_name: file.name.clone(),
                mime_type: file.mime_type.clone(),
                container: container.to_string(),
            });
        }
        if !decision.size_allowed {
            return Err(AppError::SizeExceeded {
                file_name: file.name.clone(),
                size: file.size,
                max: self.config.max_file_size(),
            });
        }

        tracker.advance(UploadState::Uploading).await?;
        let request = self.build_create_request(&decision, target.parent_location_id);
        let draft = self
            .repository
            .create_content(request)
            .await
            .map_err(|source| AppError::UploadTransportFailed {
                file_name: file.name.clone(),
                source,
            })?;

        tracker.advance(UploadState::Publishing).await?;
        let published = self
            .repository
            .publish(&draft)
            .await
            .map_err(|source| AppError::PublishFailed {
                content_id: draft.content_id,
                file_name: file.name.clone(),
                source,
            })?;

        Ok(published)
    }

    /// Reload the published content's info and type. The upload already
    /// succeeded, so failures here are only logged.
    async fn reload(&self, handle: &ContentHandle) -> Option<PublishedContent> {
        let reloaded = tokio::try_join!(
            self.repository.load_content_info(handle.content_id),
            self.content_types.load_by_id(handle.content_type_id),
        );

        match reloaded {
            Ok((content_info, content_type)) => Some(PublishedContent {
                content_info,
                content_type,
            }),
            Err(e) => {
                tracing::warn!(
                    content_id = handle.content_id,
                    error = %e,
                    "Failed to reload published content"
                );
                None
            }
        }
    }

    /// Upload several files concurrently.
    ///
    /// Every file gets its own child of `cancel`, so cancelling one upload
    /// never affects the others; cancelling `cancel` itself aborts all of
    /// them. Outcomes are returned in input order.
    #[tracing::instrument(
        skip(self, target, files, cancel, progress),
        fields(container = %target.container_content_type, files = files.len())
    )]
    pub async fn upload_batch(
        &self,
        target: &UploadTarget,
        files: Vec<UploadFile>,
        cancel: &CancellationToken,
        progress: Option<&mpsc::Sender<UploadProgress>>,
    ) -> Vec<UploadOutcome> {
        let uploads = files.into_iter().map(|file| {
            self.upload(target, file, Uuid::new_v4(), cancel.child_token(), progress)
        });
        let outcomes = join_all(uploads).await;

        let done = outcomes.iter().filter(|o| o.is_done()).count();
        tracing::info!(
            done = done,
            failed = outcomes.len() - done,
            "Upload batch finished"
        );

        outcomes
    }

    /// Delete a previously uploaded content item.
    #[tracing::instrument(skip(self))]
    pub async fn delete_uploaded(&self, content_id: u64, file_name: &str) -> Result<Notification, AppError> {
        self.repository
            .delete_content(content_id)
            .await
            .map_err(|e| match e {
                dropzone_core::HostError::NotFound(_) => {
                    AppError::NotFound(format!("Content {} not found", content_id))
                }
                source => AppError::InternalWithSource {
                    message: format!("Failed to delete content {}", content_id),
                    source: source.into(),
                },
            })?;

        tracing::info!(content_id = content_id, "Uploaded content deleted");

        Ok(Notification::new(
            format!("delete-file-{}", content_id),
            deleted_text(file_name),
            NotificationState::Done,
        ))
    }
}

fn log_upload_error(err: &AppError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error = %err, error_code = err.error_code(), "Upload rejected"),
        LogLevel::Warn => tracing::warn!(
            error = %err.detailed_message(),
            error_code = err.error_code(),
            "Upload failed"
        ),
        LogLevel::Error => tracing::error!(
            error = %err.detailed_message(),
            error_code = err.error_code(),
            "Upload failed"
        ),
    }
}
