//! Values exchanged with the hosting content repository.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content type definition as known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub id: u64,
    pub identifier: String,
    #[serde(default = "default_language_code")]
    pub main_language_code: String,
}

fn default_language_code() -> String {
    "eng-GB".to_string()
}

/// A node in the content tree that can act as an upload container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: u64,
    pub content_id: u64,
    /// Content type of the content at this location; its identifier selects the location mapping.
    pub content_type_id: u64,
}

/// Identity used to evaluate permissions on behalf of someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserReference {
    pub user_id: u64,
}

/// Value written into one content field on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPayload {
    Text(String),
    Binary { file_name: String, data: Bytes },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub field_identifier: String,
    pub payload: FieldPayload,
}

/// Request to create a draft under `parent_location_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCreateRequest {
    pub content_type_identifier: String,
    pub parent_location_id: u64,
    pub fields: Vec<FieldValue>,
}

impl ContentCreateRequest {
    pub fn field(&self, field_identifier: &str) -> Option<&FieldPayload> {
        self.fields
            .iter()
            .find(|f| f.field_identifier == field_identifier)
            .map(|f| &f.payload)
    }
}

/// Reference to a created content version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentHandle {
    pub content_id: u64,
    pub version_no: u32,
    pub content_type_id: u64,
    pub published: bool,
}

/// Metadata of a content item, reloaded after publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub id: u64,
    pub content_type_id: u64,
    pub name: String,
    pub main_location_id: Option<u64>,
    pub published_date: Option<DateTime<Utc>>,
}
