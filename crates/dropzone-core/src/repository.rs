//! Collaborator contracts of the hosting content repository.
//!
//! The core never talks to a concrete repository; services receive
//! implementations of these traits. Every method reports failures as
//! [`HostError`] so callers can classify them.

use async_trait::async_trait;

use crate::error::HostError;
use crate::models::{ContentCreateRequest, ContentHandle, ContentInfo, ContentType, Location, UserReference};

#[async_trait]
pub trait ContentTypeLookup: Send + Sync {
    async fn load_by_id(&self, id: u64) -> Result<ContentType, HostError>;

    async fn load_by_identifier(&self, identifier: &str) -> Result<ContentType, HostError>;
}

#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn load_by_id(&self, id: u64) -> Result<Location, HostError>;
}

/// Answers "may this user create content of this type under this location".
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// `acting_user` is `None` for the ambient caller identity.
    async fn can_create(
        &self,
        content_type: &ContentType,
        parent_location: &Location,
        acting_user: Option<&UserReference>,
    ) -> Result<bool, HostError>;
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Create an unpublished draft.
    async fn create_content(&self, request: ContentCreateRequest) -> Result<ContentHandle, HostError>;

    async fn publish(&self, handle: &ContentHandle) -> Result<ContentHandle, HostError>;

    async fn load_content_info(&self, content_id: u64) -> Result<ContentInfo, HostError>;

    async fn delete_content(&self, content_id: u64) -> Result<(), HostError>;
}
