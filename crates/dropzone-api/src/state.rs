//! Application state shared by all handlers.

use std::sync::Arc;

use dropzone_core::models::MappingConfiguration;
use dropzone_core::{
    AppError, Config, ContentRepository, ContentTypeLookup, HostError, LocationLookup,
    PermissionOracle,
};
use dropzone_services::{PermissionReportService, UploadOrchestrator, UploadTarget};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Normalized routing tables, loaded once at startup.
    pub mapping: Arc<MappingConfiguration>,
    pub permissions: PermissionReportService,
    pub uploads: UploadOrchestrator,
    pub locations: Arc<dyn LocationLookup>,
    pub content_types: Arc<dyn ContentTypeLookup>,
    /// Cancelled on shutdown; in-flight uploads are aborted through child tokens.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire every service to one host adapter implementing all collaborator traits.
    pub fn with_host<H>(config: Config, mapping: MappingConfiguration, host: H) -> Self
    where
        H: ContentTypeLookup + LocationLookup + PermissionOracle + ContentRepository + 'static,
    {
        let host = Arc::new(host);
        let mapping = Arc::new(mapping);
        let content_types: Arc<dyn ContentTypeLookup> = host.clone();
        let locations: Arc<dyn LocationLookup> = host.clone();
        let oracle: Arc<dyn PermissionOracle> = host.clone();
        let repository: Arc<dyn ContentRepository> = host;

        Self {
            config,
            permissions: PermissionReportService::new(
                mapping.clone(),
                content_types.clone(),
                locations.clone(),
                oracle,
            ),
            uploads: UploadOrchestrator::new(mapping.clone(), content_types.clone(), repository),
            mapping,
            locations,
            content_types,
            shutdown: CancellationToken::new(),
        }
    }

    /// Upload target for a parent location; the container identifier is the
    /// identifier of the content type at that location.
    pub async fn upload_target(&self, parent_location_id: u64) -> Result<UploadTarget, AppError> {
        let location = self
            .locations
            .load_by_id(parent_location_id)
            .await
            .map_err(|e| host_lookup_error(format!("location {}", parent_location_id), e))?;
        let container = self
            .content_types
            .load_by_id(location.content_type_id)
            .await
            .map_err(|e| host_lookup_error(format!("content type {}", location.content_type_id), e))?;

        Ok(UploadTarget {
            parent_location_id,
            container_content_type: container.identifier,
        })
    }
}

fn host_lookup_error(what: String, error: HostError) -> AppError {
    match error {
        HostError::NotFound(_) => AppError::NotFound(format!("{} not found", what)),
        source => AppError::InternalWithSource {
            message: format!("Failed to load {}", what),
            source: source.into(),
        },
    }
}
