//! In-memory content repository
//!
//! Implements every host collaborator trait over plain maps. Seeded from a
//! YAML or JSON fixture (or built programmatically), it backs the server when
//! no real repository is wired in, and serves as the test double everywhere.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dropzone_core::models::{
    ContentCreateRequest, ContentHandle, ContentInfo, ContentType, FieldPayload, Location,
    UserReference,
};
use dropzone_core::{
    AppError, ContentRepository, ContentTypeLookup, HostError, LocationLookup, PermissionOracle,
};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Host operation a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostOperation {
    Permission,
    Create,
    Publish,
    LoadContentInfo,
    Delete,
}

/// Failure shape returned by an injected failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureSpec {
    Status {
        #[serde(default)]
        code: Option<u16>,
        #[serde(default)]
        text: Option<String>,
    },
    Transport {
        message: String,
    },
    Domain {
        error_code: String,
        description: String,
    },
    NotFound {
        message: String,
    },
}

impl From<&FailureSpec> for HostError {
    fn from(spec: &FailureSpec) -> Self {
        match spec {
            FailureSpec::Status { code, text } => HostError::Status {
                code: *code,
                text: text.clone(),
            },
            FailureSpec::Transport { message } => HostError::Transport(message.clone()),
            FailureSpec::Domain {
                error_code,
                description,
            } => HostError::Domain {
                error_code: error_code.clone(),
                description: description.clone(),
            },
            FailureSpec::NotFound { message } => HostError::NotFound(message.clone()),
        }
    }
}

/// Makes one operation fail. `content_type` and `file_name` narrow the
/// failure; when both are absent every call of the operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectedFailure {
    pub operation: HostOperation,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub error: FailureSpec,
}

impl InjectedFailure {
    fn matches(&self, operation: HostOperation, content_type: &str, file_name: Option<&str>) -> bool {
        self.operation == operation
            && self.content_type.as_deref().map_or(true, |ct| ct == content_type)
            && self
                .file_name
                .as_deref()
                .map_or(true, |name| Some(name) == file_name)
    }
}

/// Create permission for a set of content types.
///
/// `user_id: None` grants the ambient (anonymous) caller; `location_id: None`
/// grants every location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub location_id: Option<u64>,
    pub content_types: Vec<String>,
}

impl Grant {
    fn allows(&self, content_type: &str, location_id: u64, acting_user: Option<&UserReference>) -> bool {
        self.user_id == acting_user.map(|u| u.user_id)
            && self.location_id.map_or(true, |id| id == location_id)
            && self.content_types.iter().any(|ct| ct == content_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureContentType {
    pub id: u64,
    pub identifier: String,
    #[serde(default)]
    pub main_language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureLocation {
    pub id: u64,
    pub content_id: u64,
    pub content_type_id: u64,
}

/// Seed of an [`InMemoryHost`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostFixture {
    #[serde(default)]
    pub content_types: Vec<FixtureContentType>,
    #[serde(default)]
    pub locations: Vec<FixtureLocation>,
    #[serde(default)]
    pub grants: Vec<Grant>,
    #[serde(default)]
    pub failures: Vec<InjectedFailure>,
}

impl HostFixture {
    pub fn from_yaml_str(input: &str) -> Result<Self, AppError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(input)?)
    }

    /// `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}

#[derive(Debug, Clone)]
struct StoredContent {
    info: ContentInfo,
    handle: ContentHandle,
    content_type_identifier: String,
    file_name: Option<String>,
    parent_location_id: u64,
}

#[derive(Debug, Default)]
struct HostState {
    content_types: HashMap<u64, ContentType>,
    locations: HashMap<u64, Location>,
    grants: Vec<Grant>,
    failures: Vec<InjectedFailure>,
    /// File names whose create call never answers.
    stalled_creates: HashSet<String>,
    contents: BTreeMap<u64, StoredContent>,
    next_content_id: u64,
    permission_queries: usize,
}

impl HostState {
    fn injected(&self, operation: HostOperation, content_type: &str, file_name: Option<&str>) -> Option<HostError> {
        self.failures
            .iter()
            .find(|f| f.matches(operation, content_type, file_name))
            .map(|f| HostError::from(&f.error))
    }

    fn content_type_by_identifier(&self, identifier: &str) -> Option<&ContentType> {
        self.content_types.values().find(|ct| ct.identifier == identifier)
    }

    fn stored(&self, content_id: u64) -> Result<&StoredContent, HostError> {
        self.contents
            .get(&content_id)
            .ok_or_else(|| HostError::NotFound(format!("content {}", content_id)))
    }

    fn next_location_id(&self) -> u64 {
        self.locations.keys().max().copied().unwrap_or(0) + 1
    }
}

/// Host adapter keeping everything in memory.
#[derive(Clone, Default)]
pub struct InMemoryHost {
    state: Arc<RwLock<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: HostFixture) -> Self {
        let mut state = HostState {
            next_content_id: 1,
            ..Default::default()
        };

        for ct in fixture.content_types {
            state.content_types.insert(
                ct.id,
                ContentType {
                    id: ct.id,
                    identifier: ct.identifier,
                    main_language_code: ct.main_language_code.unwrap_or_else(|| "eng-GB".to_string()),
                },
            );
        }
        for location in fixture.locations {
            state.next_content_id = state.next_content_id.max(location.content_id + 1);
            state.locations.insert(
                location.id,
                Location {
                    id: location.id,
                    content_id: location.content_id,
                    content_type_id: location.content_type_id,
                },
            );
        }
        state.grants = fixture.grants;
        state.failures = fixture.failures;

        tracing::debug!(
            content_types = state.content_types.len(),
            locations = state.locations.len(),
            grants = state.grants.len(),
            failures = state.failures.len(),
            "In-memory host seeded"
        );

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        Ok(Self::from_fixture(HostFixture::from_path(path)?))
    }

    pub async fn add_content_type(&self, id: u64, identifier: &str) {
        self.state.write().await.content_types.insert(
            id,
            ContentType {
                id,
                identifier: identifier.to_string(),
                main_language_code: "eng-GB".to_string(),
            },
        );
    }

    pub async fn add_location(&self, location: Location) {
        let mut state = self.state.write().await;
        state.next_content_id = state.next_content_id.max(location.content_id + 1);
        state.locations.insert(location.id, location);
    }

    pub async fn grant(&self, grant: Grant) {
        self.state.write().await.grants.push(grant);
    }

    pub async fn inject_failure(&self, failure: InjectedFailure) {
        self.state.write().await.failures.push(failure);
    }

    /// Make `create_content` hang for `file_name`, like a host that stops
    /// answering mid-upload.
    pub async fn stall_create(&self, file_name: &str) {
        self.state
            .write()
            .await
            .stalled_creates
            .insert(file_name.to_string());
    }

    /// Number of permission oracle calls answered so far.
    pub async fn permission_queries(&self) -> usize {
        self.state.read().await.permission_queries
    }

    /// Stored content ids, ascending.
    pub async fn content_ids(&self) -> Vec<u64> {
        self.state.read().await.contents.keys().copied().collect()
    }

    pub async fn content_handle(&self, content_id: u64) -> Option<ContentHandle> {
        self.state
            .read()
            .await
            .contents
            .get(&content_id)
            .map(|c| c.handle.clone())
    }
}

#[async_trait]
impl ContentTypeLookup for InMemoryHost {
    async fn load_by_id(&self, id: u64) -> Result<ContentType, HostError> {
        self.state
            .read()
            .await
            .content_types
            .get(&id)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("content type {}", id)))
    }

    async fn load_by_identifier(&self, identifier: &str) -> Result<ContentType, HostError> {
        self.state
            .read()
            .await
            .content_type_by_identifier(identifier)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("content type '{}'", identifier)))
    }
}

#[async_trait]
impl LocationLookup for InMemoryHost {
    async fn load_by_id(&self, id: u64) -> Result<Location, HostError> {
        self.state
            .read()
            .await
            .locations
            .get(&id)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("location {}", id)))
    }
}

#[async_trait]
impl PermissionOracle for InMemoryHost {
    async fn can_create(
        &self,
        content_type: &ContentType,
        parent_location: &Location,
        acting_user: Option<&UserReference>,
    ) -> Result<bool, HostError> {
        let mut state = self.state.write().await;
        state.permission_queries += 1;

        if let Some(err) = state.injected(HostOperation::Permission, &content_type.identifier, None) {
            return Err(err);
        }

        Ok(state
            .grants
            .iter()
            .any(|g| g.allows(&content_type.identifier, parent_location.id, acting_user)))
    }
}

fn file_name_of(request: &ContentCreateRequest) -> Option<String> {
    request.fields.iter().find_map(|f| match &f.payload {
        FieldPayload::Binary { file_name, .. } => Some(file_name.clone()),
        FieldPayload::Text(_) => None,
    })
}

fn name_of(request: &ContentCreateRequest) -> String {
    request
        .fields
        .iter()
        .find_map(|f| match &f.payload {
            FieldPayload::Text(text) => Some(text.clone()),
            FieldPayload::Binary { .. } => None,
        })
        .or_else(|| file_name_of(request))
        .unwrap_or_default()
}

#[async_trait]
impl ContentRepository for InMemoryHost {
    async fn create_content(&self, request: ContentCreateRequest) -> Result<ContentHandle, HostError> {
        let file_name = file_name_of(&request);
        let stalled = match file_name.as_deref() {
            Some(name) => self.state.read().await.stalled_creates.contains(name),
            None => false,
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.write().await;

        if let Some(err) = state.injected(
            HostOperation::Create,
            &request.content_type_identifier,
            file_name.as_deref(),
        ) {
            return Err(err);
        }

        if !state.locations.contains_key(&request.parent_location_id) {
            return Err(HostError::NotFound(format!(
                "location {}",
                request.parent_location_id
            )));
        }
        let content_type = state
            .content_type_by_identifier(&request.content_type_identifier)
            .cloned()
            .ok_or_else(|| HostError::Status {
                code: Some(400),
                text: Some(format!(
                    "Unknown content type '{}'",
                    request.content_type_identifier
                )),
            })?;

        let content_id = state.next_content_id.max(1);
        state.next_content_id = content_id + 1;

        let handle = ContentHandle {
            content_id,
            version_no: 1,
            content_type_id: content_type.id,
            published: false,
        };
        let stored = StoredContent {
            info: ContentInfo {
                id: content_id,
                content_type_id: content_type.id,
                name: name_of(&request),
                main_location_id: None,
                published_date: None,
            },
            handle: handle.clone(),
            content_type_identifier: content_type.identifier,
            file_name,
            parent_location_id: request.parent_location_id,
        };
        state.contents.insert(content_id, stored);

        Ok(handle)
    }

    async fn publish(&self, handle: &ContentHandle) -> Result<ContentHandle, HostError> {
        let mut state = self.state.write().await;
        let stored = state.stored(handle.content_id)?.clone();

        if let Some(err) = state.injected(
            HostOperation::Publish,
            &stored.content_type_identifier,
            stored.file_name.as_deref(),
        ) {
            return Err(err);
        }

        let location_id = match stored.info.main_location_id {
            Some(id) => id,
            None => {
                let id = state.next_location_id();
                state.locations.insert(
                    id,
                    Location {
                        id,
                        content_id: stored.info.id,
                        content_type_id: stored.info.content_type_id,
                    },
                );
                id
            }
        };

        let published = ContentHandle {
            published: true,
            ..stored.handle.clone()
        };
        if let Some(content) = state.contents.get_mut(&handle.content_id) {
            content.handle = published.clone();
            content.info.main_location_id = Some(location_id);
            content.info.published_date = Some(Utc::now());
        }

        tracing::debug!(
            content_id = handle.content_id,
            parent_location_id = stored.parent_location_id,
            location_id = location_id,
            "Content published"
        );

        Ok(published)
    }

    async fn load_content_info(&self, content_id: u64) -> Result<ContentInfo, HostError> {
        let state = self.state.read().await;
        let stored = state.stored(content_id)?;

        if let Some(err) = state.injected(
            HostOperation::LoadContentInfo,
            &stored.content_type_identifier,
            stored.file_name.as_deref(),
        ) {
            return Err(err);
        }

        Ok(stored.info.clone())
    }

    async fn delete_content(&self, content_id: u64) -> Result<(), HostError> {
        let mut state = self.state.write().await;
        let stored = state.stored(content_id)?.clone();

        if let Some(err) = state.injected(
            HostOperation::Delete,
            &stored.content_type_identifier,
            stored.file_name.as_deref(),
        ) {
            return Err(err);
        }

        state.contents.remove(&content_id);
        if let Some(location_id) = stored.info.main_location_id {
            state.locations.remove(&location_id);
        }
        Ok(())
    }
}
