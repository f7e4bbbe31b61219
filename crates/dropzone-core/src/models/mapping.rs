use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::DEFAULT_NAME_FIELD;

/// Rule routing one or more MIME types to a content type and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MimeTypeMapping {
    /// Exact MIME types handled by this rule, in authored order, without duplicates.
    pub mime_types: Vec<String>,
    pub content_type_identifier: String,
    /// Binary field that receives the uploaded file.
    pub content_field_identifier: String,
    /// Text field that receives the file name.
    pub name_field_identifier: String,
}

impl MimeTypeMapping {
    /// Exact, case-sensitive membership test. Wildcards are not expanded here.
    pub fn handles(&self, mime_type: &str) -> bool {
        self.mime_types.iter().any(|m| m == mime_type)
    }
}

/// Mappings bound to containers of one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationMapping {
    #[serde(rename = "contentTypeIdentifier")]
    pub container_content_type_identifier: String,
    /// File-picker hint; may contain wildcards like `image/*`.
    pub mime_type_filter: Vec<String>,
    pub mappings: Vec<MimeTypeMapping>,
}

/// Last-resort target when no mapping matches.
///
/// Either every field is set or none is; a half-configured fallback is
/// collapsed when the configuration is normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FallbackContentType {
    pub content_type_identifier: Option<String>,
    pub content_field_identifier: Option<String>,
    pub name_field_identifier: Option<String>,
}

impl FallbackContentType {
    /// A fallback that resolves nothing.
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.content_type_identifier.is_some() && self.content_field_identifier.is_some()
    }
}

/// Root of the upload routing configuration.
///
/// Built once by [`crate::mapping::normalize`] and shared read-only afterwards
/// (typically behind an `Arc`). There is no mutation API; reconfiguring means
/// normalizing a new raw configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfiguration {
    location_mappings: Vec<LocationMapping>,
    default_mappings: Vec<MimeTypeMapping>,
    fallback_content_type: FallbackContentType,
    max_file_size: u64,
}

impl MappingConfiguration {
    pub(crate) fn new(
        location_mappings: Vec<LocationMapping>,
        default_mappings: Vec<MimeTypeMapping>,
        fallback_content_type: FallbackContentType,
        max_file_size: u64,
    ) -> Self {
        Self {
            location_mappings,
            default_mappings,
            fallback_content_type,
            max_file_size,
        }
    }

    pub fn location_mappings(&self) -> &[LocationMapping] {
        &self.location_mappings
    }

    pub fn default_mappings(&self) -> &[MimeTypeMapping] {
        &self.default_mappings
    }

    pub fn fallback_content_type(&self) -> &FallbackContentType {
        &self.fallback_content_type
    }

    /// Maximum accepted upload size in bytes (inclusive).
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Location mapping for containers of the given content type, if any.
    pub fn location_mapping(&self, container_content_type_identifier: &str) -> Option<&LocationMapping> {
        self.location_mappings
            .iter()
            .find(|l| l.container_content_type_identifier == container_content_type_identifier)
    }
}

/// Which tier of the configuration produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Location,
    Default,
    Fallback,
}

impl MappingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingSource::Location => "location",
            MappingSource::Default => "default",
            MappingSource::Fallback => "fallback",
        }
    }
}

/// Target content type and fields for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMapping {
    pub content_type_identifier: String,
    pub content_field_identifier: String,
    pub name_field_identifier: String,
    pub source: MappingSource,
}

impl ResolvedMapping {
    pub(crate) fn from_mapping(mapping: &MimeTypeMapping, source: MappingSource) -> Self {
        Self {
            content_type_identifier: mapping.content_type_identifier.clone(),
            content_field_identifier: mapping.content_field_identifier.clone(),
            name_field_identifier: mapping.name_field_identifier.clone(),
            source,
        }
    }

    /// Field receiving the file name; `name` when the mapping leaves it empty.
    pub fn name_field(&self) -> &str {
        if self.name_field_identifier.is_empty() {
            DEFAULT_NAME_FIELD
        } else {
            &self.name_field_identifier
        }
    }
}
