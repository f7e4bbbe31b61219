use std::collections::BTreeSet;
use std::sync::Arc;

use dropzone_core::models::{
    ContentType, Location, MappingConfiguration, PermissionPointReport, PermissionReport,
    UserReference,
};
use dropzone_core::{
    candidate_content_types, AppError, ContentTypeLookup, HostError, LocationLookup,
    PermissionOracle,
};
use futures::future::try_join_all;

/// Builds create-permission reports for upload containers.
///
/// Every candidate content type is checked with one oracle query; queries run
/// concurrently and the report is only built once all of them succeeded.
#[derive(Clone)]
pub struct PermissionReportService {
    config: Arc<MappingConfiguration>,
    content_types: Arc<dyn ContentTypeLookup>,
    locations: Arc<dyn LocationLookup>,
    oracle: Arc<dyn PermissionOracle>,
}

impl PermissionReportService {
    pub fn new(
        config: Arc<MappingConfiguration>,
        content_types: Arc<dyn ContentTypeLookup>,
        locations: Arc<dyn LocationLookup>,
        oracle: Arc<dyn PermissionOracle>,
    ) -> Self {
        Self {
            config,
            content_types,
            locations,
            oracle,
        }
    }

    /// Which of the container's candidate content types may be created under
    /// `parent_location`.
    ///
    /// `acting_user` impersonates another user for the duration of the
    /// queries; `None` checks the ambient caller.
    #[tracing::instrument(
        skip(self, parent_location, acting_user),
        fields(container = %container, location_id = parent_location.id)
    )]
    pub async fn check_create_permission(
        &self,
        container: &str,
        parent_location: &Location,
        acting_user: Option<&UserReference>,
    ) -> Result<PermissionReport, AppError> {
        let candidates = candidate_content_types(&self.config, container);

        let checks = candidates
            .iter()
            .map(|identifier| self.check_candidate(identifier, parent_location, acting_user));
        let answers = try_join_all(checks).await?;

        let allowed: BTreeSet<String> = answers
            .into_iter()
            .filter_map(|(identifier, allowed)| allowed.then_some(identifier))
            .collect();

        tracing::debug!(
            candidates = candidates.len(),
            allowed = allowed.len(),
            "Permission report built"
        );

        Ok(PermissionReport::content_create(parent_location.id, allowed))
    }

    async fn check_candidate(
        &self,
        identifier: &str,
        parent_location: &Location,
        acting_user: Option<&UserReference>,
    ) -> Result<(String, bool), AppError> {
        let permission_failed = |source: HostError| AppError::PermissionCheckFailed {
            content_type: identifier.to_string(),
            source,
        };

        let content_type = self
            .content_types
            .load_by_identifier(identifier)
            .await
            .map_err(permission_failed)?;
        let allowed = self
            .oracle
            .can_create(&content_type, parent_location, acting_user)
            .await
            .map_err(permission_failed)?;

        Ok((identifier.to_string(), allowed))
    }

    /// Set report for a location id; the container identifier is derived from
    /// the content type of the content at that location.
    #[tracing::instrument(skip(self, acting_user))]
    pub async fn can_user_create_content(
        &self,
        parent_location_id: u64,
        acting_user: Option<&UserReference>,
    ) -> Result<PermissionReport, AppError> {
        let location = self
            .locations
            .load_by_id(parent_location_id)
            .await
            .map_err(|e| lookup_failed(format!("location {}", parent_location_id), e))?;
        let container = self.container_type(&location).await?;

        self.check_create_permission(&container.identifier, &location, acting_user)
            .await
    }

    /// Narrow point check for one content type, as the ambient caller.
    #[tracing::instrument(skip(self))]
    pub async fn check_point_permission(
        &self,
        content_type_id: u64,
        parent_location_id: u64,
    ) -> Result<PermissionPointReport, AppError> {
        let (content_type, location) = tokio::try_join!(
            async {
                self.content_types
                    .load_by_id(content_type_id)
                    .await
                    .map_err(|e| lookup_failed(format!("content type {}", content_type_id), e))
            },
            async {
                self.locations
                    .load_by_id(parent_location_id)
                    .await
                    .map_err(|e| lookup_failed(format!("location {}", parent_location_id), e))
            },
        )?;

        let allowed = self
            .oracle
            .can_create(&content_type, &location, None)
            .await
            .map_err(|source| AppError::PermissionCheckFailed {
                content_type: content_type.identifier.clone(),
                source,
            })?;

        Ok(PermissionPointReport::content_create(
            location.id,
            content_type.id,
            allowed,
        ))
    }

    async fn container_type(&self, location: &Location) -> Result<ContentType, AppError> {
        self.content_types
            .load_by_id(location.content_type_id)
            .await
            .map_err(|e| lookup_failed(format!("content type {}", location.content_type_id), e))
    }
}

/// Missing entities are client errors; anything else means the host could not
/// answer.
fn lookup_failed(what: String, err: HostError) -> AppError {
    match err {
        HostError::NotFound(_) => AppError::NotFound(format!("{} not found", what)),
        source => AppError::PermissionCheckFailed {
            content_type: what,
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FailureSpec, Grant, HostOperation, InMemoryHost, InjectedFailure};
    use dropzone_core::{normalize, RawMappingConfig};

    const MAPPINGS: &str = r#"
location_mappings:
  - content_type_identifier: gallery
    mime_type_filter: ["image/*", "video/*"]
    mappings:
      - mime_types: [image/png, image/jpeg]
        content_type_identifier: image
        content_field_identifier: image
      - mime_types: [video/mp4]
        content_type_identifier: video
        content_field_identifier: file
      - mime_types: [application/pdf]
        content_type_identifier: file
        content_field_identifier: file
default_mappings:
  - mime_types: [application/msword]
    content_type_identifier: file
    content_field_identifier: file
fallback_content_type:
  content_type_identifier: file
  content_field_identifier: file
"#;

    async fn fixture() -> (PermissionReportService, InMemoryHost) {
        let config = normalize(&RawMappingConfig::from_yaml_str(MAPPINGS).unwrap()).unwrap();
        let host = InMemoryHost::new();
        host.add_content_type(1, "gallery").await;
        host.add_content_type(2, "folder").await;
        host.add_content_type(3, "image").await;
        host.add_content_type(4, "video").await;
        host.add_content_type(5, "file").await;
        host.add_location(Location {
            id: 20,
            content_id: 200,
            content_type_id: 1,
        })
        .await;
        host.add_location(Location {
            id: 30,
            content_id: 300,
            content_type_id: 2,
        })
        .await;
        host.grant(Grant {
            user_id: None,
            location_id: None,
            content_types: vec!["image".to_string(), "file".to_string()],
        })
        .await;

        let shared = Arc::new(host.clone());
        let service = PermissionReportService::new(
            Arc::new(config),
            shared.clone(),
            shared.clone(),
            shared,
        );
        (service, host)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_gallery_report_contains_creatable_candidates() {
        let (service, host) = fixture().await;
        let location = LocationLookup::load_by_id(&host, 20).await.unwrap();

        let report = service
            .check_create_permission("gallery", &location, None)
            .await
            .unwrap();

        assert_eq!(report.allowed_content_types, set(&["image", "file"]));
        assert_eq!(report.parent_location_id, 20);
        assert_eq!(report.module, "content");
        assert_eq!(report.function, "create");
        // one query per candidate
        assert_eq!(host.permission_queries().await, 3);
    }

    #[tokio::test]
    async fn test_candidates_are_deduplicated_before_querying() {
        let (service, host) = fixture().await;
        let location = LocationLookup::load_by_id(&host, 30).await.unwrap();

        let report = service
            .check_create_permission("folder", &location, None)
            .await
            .unwrap();

        // default mapping and fallback both point at `file`
        assert_eq!(report.allowed_content_types, set(&["file"]));
        assert_eq!(host.permission_queries().await, 1);
    }

    #[tokio::test]
    async fn test_acting_user_is_used_for_queries() {
        let (service, host) = fixture().await;
        host.grant(Grant {
            user_id: Some(14),
            location_id: Some(20),
            content_types: vec!["video".to_string()],
        })
        .await;
        let location = LocationLookup::load_by_id(&host, 20).await.unwrap();

        let report = service
            .check_create_permission("gallery", &location, Some(&UserReference { user_id: 14 }))
            .await
            .unwrap();

        assert_eq!(report.allowed_content_types, set(&["video"]));
    }

    #[tokio::test]
    async fn test_oracle_failure_fails_the_whole_report() {
        let (service, host) = fixture().await;
        host.inject_failure(InjectedFailure {
            operation: HostOperation::Permission,
            content_type: Some("video".to_string()),
            file_name: None,
            error: FailureSpec::Transport {
                message: "connection reset".to_string(),
            },
        })
        .await;
        let location = LocationLookup::load_by_id(&host, 20).await.unwrap();

        let err = service
            .check_create_permission("gallery", &location, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::PermissionCheckFailed { ref content_type, .. } if content_type == "video"
        ));
    }

    #[tokio::test]
    async fn test_unknown_candidate_type_is_permission_failure() {
        let (service, _host) = fixture().await;
        let config = normalize(
            &RawMappingConfig::from_yaml_str(
                "default_mappings:\n  - mime_type: text/csv\n    content_type_identifier: spreadsheet\n    content_field_identifier: file\n",
            )
            .unwrap(),
        )
        .unwrap();
        let service = PermissionReportService {
            config: Arc::new(config),
            ..service
        };
        let location = Location {
            id: 30,
            content_id: 300,
            content_type_id: 2,
        };

        let err = service
            .check_create_permission("folder", &location, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionCheckFailed { .. }));
    }

    #[tokio::test]
    async fn test_can_user_create_content_derives_container() {
        let (service, _host) = fixture().await;

        let report = service.can_user_create_content(20, None).await.unwrap();
        assert_eq!(report.allowed_content_types, set(&["image", "file"]));
        assert!(report.is_any_create_allowed());

        let err = service.can_user_create_content(999, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_report_when_nothing_is_granted() {
        let (service, _host) = fixture().await;
        let report = service
            .can_user_create_content(20, Some(&UserReference { user_id: 99 }))
            .await
            .unwrap();
        assert!(report.allowed_content_types.is_empty());
        assert!(!report.is_any_create_allowed());
    }

    #[tokio::test]
    async fn test_point_permission() {
        let (service, _host) = fixture().await;

        let allowed = service.check_point_permission(3, 20).await.unwrap();
        assert!(allowed.allowed);
        assert_eq!(allowed.content_type_id, 3);
        assert_eq!(allowed.parent_location_id, 20);

        let denied = service.check_point_permission(4, 20).await.unwrap();
        assert!(!denied.allowed);

        let err = service.check_point_permission(3, 404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
