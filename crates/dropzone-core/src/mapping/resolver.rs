//! MIME type -> content type routing.
//!
//! Resolution is an ordered list of steps; each step either yields a mapping
//! or passes. The first step that yields wins.

use std::collections::BTreeSet;

use crate::models::{MappingConfiguration, MappingSource, MimeTypeMapping, ResolvedMapping};
use crate::AppError;

/// One tier of the configuration consulted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    LocationMappings,
    DefaultMappings,
    Fallback,
}

pub const RESOLUTION_ORDER: [ResolutionStep; 3] = [
    ResolutionStep::LocationMappings,
    ResolutionStep::DefaultMappings,
    ResolutionStep::Fallback,
];

impl ResolutionStep {
    fn apply(
        &self,
        config: &MappingConfiguration,
        container: &str,
        mime_type: &str,
    ) -> Option<ResolvedMapping> {
        match self {
            ResolutionStep::LocationMappings => config
                .location_mapping(container)
                .and_then(|location| first_match(&location.mappings, mime_type))
                .map(|m| ResolvedMapping::from_mapping(m, MappingSource::Location)),
            ResolutionStep::DefaultMappings => first_match(config.default_mappings(), mime_type)
                .map(|m| ResolvedMapping::from_mapping(m, MappingSource::Default)),
            ResolutionStep::Fallback => {
                let fallback = config.fallback_content_type();
                match (
                    &fallback.content_type_identifier,
                    &fallback.content_field_identifier,
                ) {
                    (Some(content_type), Some(content_field)) => Some(ResolvedMapping {
                        content_type_identifier: content_type.clone(),
                        content_field_identifier: content_field.clone(),
                        name_field_identifier: fallback
                            .name_field_identifier
                            .clone()
                            .unwrap_or_default(),
                        source: MappingSource::Fallback,
                    }),
                    _ => None,
                }
            }
        }
    }
}

fn first_match<'a>(mappings: &'a [MimeTypeMapping], mime_type: &str) -> Option<&'a MimeTypeMapping> {
    mappings.iter().find(|m| m.handles(mime_type))
}

/// Resolve the target content type for a file of `mime_type` dropped into a
/// container of type `container`.
///
/// Location mappings are tried first; when the container has none, or none of
/// them handles the MIME type, default mappings are tried, then the fallback.
pub fn resolve_mapping(
    config: &MappingConfiguration,
    container: &str,
    mime_type: &str,
) -> Result<ResolvedMapping, AppError> {
    let resolved = RESOLUTION_ORDER
        .iter()
        .find_map(|step| step.apply(config, container, mime_type));

    match resolved {
        Some(mapping) => {
            tracing::debug!(
                container = %container,
                mime_type = %mime_type,
                content_type = %mapping.content_type_identifier,
                source = mapping.source.as_str(),
                "Resolved upload mapping"
            );
            Ok(mapping)
        }
        None => Err(AppError::UnresolvedMimeType {
            container: container.to_string(),
            mime_type: mime_type.to_string(),
        }),
    }
}

/// Every content type a container could ever hold.
///
/// The container's own mappings when it has any, otherwise the default
/// mappings plus the fallback (when configured).
pub fn candidate_content_types(config: &MappingConfiguration, container: &str) -> BTreeSet<String> {
    if let Some(location) = config.location_mapping(container) {
        if !location.mappings.is_empty() {
            return location
                .mappings
                .iter()
                .map(|m| m.content_type_identifier.clone())
                .collect();
        }
    }

    let mut candidates: BTreeSet<String> = config
        .default_mappings()
        .iter()
        .map(|m| m.content_type_identifier.clone())
        .collect();
    if let Some(fallback) = &config.fallback_content_type().content_type_identifier {
        candidates.insert(fallback.clone());
    }
    candidates
}

/// Whether a file of `mime_type` may be dropped into `container` at all.
///
/// A container with a location mapping only accepts the MIME types its
/// mappings list; containers without one accept anything.
pub fn is_type_allowed(config: &MappingConfiguration, container: &str, mime_type: &str) -> bool {
    match config.location_mapping(container) {
        Some(location) => location.mappings.iter().any(|m| m.handles(mime_type)),
        None => true,
    }
}

/// File-picker hint for a container. Empty means "no restriction".
pub fn file_picker_filter<'a>(config: &'a MappingConfiguration, container: &str) -> &'a [String] {
    config
        .location_mapping(container)
        .map(|l| l.mime_type_filter.as_slice())
        .unwrap_or_default()
}

/// Match a MIME type against file-picker patterns such as `image/*` or `*/*`.
/// An empty pattern list matches everything.
pub fn mime_matches_filter(filter: &[String], mime_type: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let (kind, subtype) = mime_type.split_once('/').unwrap_or((mime_type, ""));
    filter.iter().any(|pattern| match pattern.split_once('/') {
        Some(("*", "*")) => true,
        Some((p_kind, "*")) => p_kind.eq_ignore_ascii_case(kind),
        Some((p_kind, p_subtype)) => {
            p_kind.eq_ignore_ascii_case(kind) && p_subtype.eq_ignore_ascii_case(subtype)
        }
        None => pattern == "*",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{normalize, RawMappingConfig};

    fn config(yaml: &str) -> MappingConfiguration {
        normalize(&RawMappingConfig::from_yaml_str(yaml).unwrap()).unwrap()
    }

    const GALLERY_CONFIG: &str = r#"
location_mappings:
  - content_type_identifier: gallery
    mime_type_filter: ["image/*"]
    mappings:
      - mime_types: [image/jpeg, image/png, image/gif]
        content_type_identifier: image
        content_field_identifier: image
        name_field_identifier: name
      - mime_types: [video/mp4]
        content_type_identifier: video
        content_field_identifier: file
default_mappings:
  - mime_types: [application/msword, application/pdf]
    content_type_identifier: file
    content_field_identifier: file
  - mime_types: [image/png]
    content_type_identifier: image
    content_field_identifier: image
fallback_content_type:
  content_type_identifier: file
  content_field_identifier: file
  name_field_identifier: name
"#;

    const NO_FALLBACK_CONFIG: &str = r#"
default_mappings:
  - mime_types: [application/msword]
    content_type_identifier: file
    content_field_identifier: file
"#;

    #[test]
    fn test_location_mapping_resolves_gallery_image() {
        let config = config(GALLERY_CONFIG);
        let resolved = resolve_mapping(&config, "gallery", "image/png").unwrap();

        assert_eq!(resolved.content_type_identifier, "image");
        assert_eq!(resolved.content_field_identifier, "image");
        assert_eq!(resolved.name_field_identifier, "name");
        assert_eq!(resolved.source, MappingSource::Location);
    }

    #[test]
    fn test_container_without_location_mapping_uses_defaults() {
        let config = config(GALLERY_CONFIG);
        let resolved = resolve_mapping(&config, "folder", "application/msword").unwrap();

        assert_eq!(resolved.content_type_identifier, "file");
        assert_eq!(resolved.content_field_identifier, "file");
        assert_eq!(resolved.source, MappingSource::Default);
    }

    #[test]
    fn test_unmatched_location_falls_through_to_defaults() {
        let config = config(GALLERY_CONFIG);
        let resolved = resolve_mapping(&config, "gallery", "application/pdf").unwrap();
        assert_eq!(resolved.source, MappingSource::Default);
    }

    #[test]
    fn test_unmatched_everywhere_uses_fallback() {
        let config = config(GALLERY_CONFIG);
        let resolved = resolve_mapping(&config, "folder", "text/csv").unwrap();
        assert_eq!(resolved.content_type_identifier, "file");
        assert_eq!(resolved.source, MappingSource::Fallback);
    }

    #[test]
    fn test_unresolved_without_fallback() {
        let config = config(NO_FALLBACK_CONFIG);
        let err = resolve_mapping(&config, "folder", "application/x-unknown").unwrap_err();
        assert!(matches!(
            err,
            AppError::UnresolvedMimeType { ref mime_type, .. } if mime_type == "application/x-unknown"
        ));
    }

    #[test]
    fn test_wildcards_are_not_used_for_resolution() {
        let config = config(GALLERY_CONFIG);
        // image/webp is covered by the `image/*` picker filter only
        let resolved = resolve_mapping(&config, "gallery", "image/webp").unwrap();
        assert_eq!(resolved.source, MappingSource::Fallback);
    }

    #[test]
    fn test_first_match_wins() {
        let config = config(
            r#"
default_mappings:
  - mime_types: [image/png]
    content_type_identifier: first
    content_field_identifier: a
  - mime_types: [image/png]
    content_type_identifier: second
    content_field_identifier: b
"#,
        );
        for _ in 0..3 {
            let resolved = resolve_mapping(&config, "folder", "image/png").unwrap();
            assert_eq!(resolved.content_type_identifier, "first");
        }
    }

    #[test]
    fn test_resolution_never_synthesizes_values() {
        let config = config(GALLERY_CONFIG);
        let sources: Vec<(String, String)> = config
            .location_mappings()
            .iter()
            .flat_map(|l| l.mappings.iter())
            .chain(config.default_mappings().iter())
            .map(|m| (m.content_type_identifier.clone(), m.content_field_identifier.clone()))
            .chain(std::iter::once(("file".to_string(), "file".to_string())))
            .collect();

        for container in ["gallery", "folder", "blog"] {
            for mime in ["image/png", "image/jpeg", "video/mp4", "application/pdf", "x/y", ""] {
                let resolved = resolve_mapping(&config, container, mime).unwrap();
                assert!(sources.contains(&(
                    resolved.content_type_identifier.clone(),
                    resolved.content_field_identifier.clone()
                )));
            }
        }
    }

    #[test]
    fn test_candidates_for_location_with_mappings() {
        let config = config(GALLERY_CONFIG);
        let candidates = candidate_content_types(&config, "gallery");
        assert_eq!(
            candidates,
            BTreeSet::from(["image".to_string(), "video".to_string()])
        );
    }

    #[test]
    fn test_candidates_default_and_fallback_deduplicated() {
        let config = config(GALLERY_CONFIG);
        let candidates = candidate_content_types(&config, "folder");
        assert_eq!(candidates, BTreeSet::from(["file".to_string(), "image".to_string()]));
    }

    #[test]
    fn test_candidates_skip_null_fallback() {
        let config = config(NO_FALLBACK_CONFIG);
        assert_eq!(
            candidate_content_types(&config, "folder"),
            BTreeSet::from(["file".to_string()])
        );
    }

    #[test]
    fn test_candidates_location_with_empty_mappings_uses_defaults() {
        let config = config(
            r#"
location_mappings:
  - content_type_identifier: archive
    mime_type_filter: ["application/*"]
default_mappings:
  - mime_types: [application/zip]
    content_type_identifier: file
    content_field_identifier: file
"#,
        );
        assert_eq!(
            candidate_content_types(&config, "archive"),
            BTreeSet::from(["file".to_string()])
        );
    }

    #[test]
    fn test_candidates_are_order_independent() {
        let forward = config(
            r#"
default_mappings:
  - mime_types: [a/a]
    content_type_identifier: alpha
    content_field_identifier: f
  - mime_types: [b/b]
    content_type_identifier: beta
    content_field_identifier: f
"#,
        );
        let reversed = config(
            r#"
default_mappings:
  - mime_types: [b/b]
    content_type_identifier: beta
    content_field_identifier: f
  - mime_types: [a/a]
    content_type_identifier: alpha
    content_field_identifier: f
"#,
        );
        let once = candidate_content_types(&forward, "folder");
        assert_eq!(once, candidate_content_types(&forward, "folder"));
        assert_eq!(once, candidate_content_types(&reversed, "folder"));
    }

    #[test]
    fn test_type_allowed_only_checks_location_allow_list() {
        let config = config(GALLERY_CONFIG);
        assert!(is_type_allowed(&config, "gallery", "image/png"));
        assert!(!is_type_allowed(&config, "gallery", "application/pdf"));
        assert!(is_type_allowed(&config, "folder", "anything/at-all"));
    }

    #[test]
    fn test_file_picker_filter() {
        let config = config(GALLERY_CONFIG);
        assert_eq!(file_picker_filter(&config, "gallery"), ["image/*".to_string()]);
        assert!(file_picker_filter(&config, "folder").is_empty());
    }

    #[test]
    fn test_mime_matches_filter_wildcards() {
        let images = vec!["image/*".to_string()];
        assert!(mime_matches_filter(&images, "image/png"));
        assert!(mime_matches_filter(&images, "IMAGE/svg+xml"));
        assert!(!mime_matches_filter(&images, "video/mp4"));

        assert!(mime_matches_filter(&["*/*".to_string()], "video/mp4"));
        assert!(mime_matches_filter(&["application/pdf".to_string()], "application/pdf"));
        assert!(!mime_matches_filter(&["application/pdf".to_string()], "application/zip"));
        assert!(mime_matches_filter(&[], "whatever/else"));
    }
}
