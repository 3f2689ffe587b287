//! Request and response shapes for repository configurations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repository configuration as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryResponse {
    /// Read-only identifier of the configuration.
    pub uuid: Uuid,
    pub name: String,
    /// URL of the remote yum repository.
    pub url: String,
    /// Versions to restrict client usage to.
    pub distribution_versions: Vec<String>,
    /// Architecture to restrict client usage to.
    pub distribution_arch: String,
    /// Account ID of the owner (read-only).
    pub account_id: String,
    /// Organization ID of the owner (read-only).
    pub org_id: String,
}

/// Data received to create or update a repository configuration.
///
/// Every mutable field is optional so that a partial update can tell an
/// omitted field apart from one explicitly set to an empty value. Owner
/// identifiers are never read from the body; the caller's identity fills
/// them in via [`RepositoryRequest::with_owner`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepositoryRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub distribution_versions: Option<Vec<String>>,
    pub distribution_arch: Option<String>,
    #[serde(skip_deserializing)]
    pub account_id: Option<String>,
    #[serde(skip_deserializing)]
    pub org_id: Option<String>,
}

impl RepositoryRequest {
    /// Attach the owning account and organization.
    pub fn with_owner(mut self, account_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self.org_id = Some(org_id.into());
        self
    }

    /// Replace absent mutable fields with their zero values.
    ///
    /// Used for full replacement (PUT), where every field must carry a
    /// concrete value. The result does not have to be valid; validation
    /// happens at the store.
    pub fn fill_defaults(&mut self) {
        self.name.get_or_insert_with(String::new);
        self.url.get_or_insert_with(String::new);
        self.distribution_versions.get_or_insert_with(Vec::new);
        self.distribution_arch.get_or_insert_with(String::new);
    }
}

/// Per-item outcome of a bulk create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryBulkCreateResponse {
    /// Error during creation of this item.
    pub error: Option<String>,
    pub repository: Option<RepositoryResponse>,
}

impl RepositoryBulkCreateResponse {
    pub fn created(repository: RepositoryResponse) -> Self {
        Self {
            error: None,
            repository: Some(repository),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            repository: None,
        }
    }
}

/// Metadata about a collection request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Total count of matching results, before paging.
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Links to other pages of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub first: String,
    pub last: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// A page of repository configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCollectionResponse {
    pub data: Vec<RepositoryResponse>,
    pub meta: ResponseMetadata,
    pub links: Links,
}

impl RepositoryCollectionResponse {
    pub fn new(data: Vec<RepositoryResponse>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn set_metadata(&mut self, meta: ResponseMetadata, links: Links) {
        self.meta = meta;
        self.links = links;
    }
}
