//! Mapping configuration as authored by operators (snake_case keys).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Root of the authored configuration.
///
/// Every top-level key is optional; `null` and absent are treated alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMappingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_mappings: Option<Vec<RawLocationMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mappings: Option<Vec<RawMimeTypeMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_content_type: Option<RawFallbackContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RawLocationMapping {
    /// Content type identifier of the containers this entry applies to.
    #[validate(length(min = 1, message = "content_type_identifier cannot be empty"))]
    pub content_type_identifier: String,
    #[serde(default)]
    pub mime_type_filter: Vec<String>,
    #[serde(default)]
    pub mappings: Vec<RawMimeTypeMapping>,
}

/// One mapping entry. Accepts the historic single `mime_type` key as well as
/// the `mime_types` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RawMimeTypeMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_types: Option<Vec<String>>,
    #[validate(length(min = 1, message = "content_type_identifier cannot be empty"))]
    pub content_type_identifier: String,
    #[validate(length(min = 1, message = "content_field_identifier cannot be empty"))]
    pub content_field_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field_identifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFallbackContentType {
    #[serde(default)]
    pub content_type_identifier: Option<String>,
    #[serde(default)]
    pub content_field_identifier: Option<String>,
    #[serde(default)]
    pub name_field_identifier: Option<String>,
}

impl RawMappingConfig {
    /// Parse YAML (JSON documents are accepted too, being valid YAML).
    pub fn from_yaml_str(input: &str) -> Result<Self, crate::AppError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, crate::AppError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, crate::AppError> {
        Ok(serde_json::from_value(value)?)
    }
}
