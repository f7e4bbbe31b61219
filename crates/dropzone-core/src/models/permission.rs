use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::{PERMISSION_FUNCTION, PERMISSION_MODULE};

/// Which candidate content types the acting user may create under a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionReport {
    pub parent_location_id: u64,
    pub module: String,
    pub function: String,
    /// Unordered; serialized sorted for stable output.
    pub allowed_content_types: BTreeSet<String>,
}

impl PermissionReport {
    pub fn content_create(parent_location_id: u64, allowed_content_types: BTreeSet<String>) -> Self {
        Self {
            parent_location_id,
            module: PERMISSION_MODULE.to_string(),
            function: PERMISSION_FUNCTION.to_string(),
            allowed_content_types,
        }
    }

    /// Whether the drop zone should be enabled at all.
    pub fn is_any_create_allowed(&self) -> bool {
        !self.allowed_content_types.is_empty()
    }

    pub fn allows(&self, content_type_identifier: &str) -> bool {
        self.allowed_content_types.contains(content_type_identifier)
    }
}

/// Point check: may the acting user create one content type under a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPointReport {
    pub parent_location_id: u64,
    pub content_type_id: u64,
    pub module: String,
    pub function: String,
    pub allowed: bool,
}

impl PermissionPointReport {
    pub fn content_create(parent_location_id: u64, content_type_id: u64, allowed: bool) -> Self {
        Self {
            parent_location_id,
            content_type_id,
            module: PERMISSION_MODULE.to_string(),
            function: PERMISSION_FUNCTION.to_string(),
            allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_report_serializes_camel_case() {
        let report = PermissionReport::content_create(
            42,
            ["image".to_string(), "file".to_string()].into_iter().collect(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["parentLocationId"], 42);
        assert_eq!(json["module"], "content");
        assert_eq!(json["function"], "create");
        assert_eq!(json["allowedContentTypes"], serde_json::json!(["file", "image"]));
        assert!(report.is_any_create_allowed());
    }

    #[test]
    fn test_point_report_fields() {
        let report = PermissionPointReport::content_create(2, 5, false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["contentTypeId"], 5);
        assert_eq!(json["allowed"], false);
    }
}
