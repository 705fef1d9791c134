// Gist API record types.
// Typed metadata, comments, forks, history entries, and request bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw key/value metadata payload as returned by the service.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Decoded gist metadata, immutable once cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistMetadata {
    pub id: String,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub public: bool,
    /// Canonical filenames in server order.
    pub file_names: Vec<String>,
    /// Server-supplied raw content URLs, by canonical filename.
    #[serde(default)]
    pub raw_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub forks: Vec<Fork>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Fields the model does not cover, kept as strings.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl GistMetadata {
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

/// Comment on a gist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub gravatar_id: Option<String>,
    pub user: Option<String>,
}

/// Fork of a gist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fork {
    pub user: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Line counts of one revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub total: Option<u64>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
}

/// One revision in a gist's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: Option<String>,
    pub version: Option<String>,
    pub user: Option<String>,
    pub change_status: ChangeStatus,
    pub committed_at: Option<DateTime<Utc>>,
}

/// Per-file entry of an update body, keyed by canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    /// Display name the file should carry after the update.
    pub filename: String,
    pub ext: String,
    pub content: String,
}

/// Body of `PATCH /gists/{id}`. A `None` file entry deletes that file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub files: BTreeMap<String, Option<FileUpdate>>,
}

/// File content of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFile {
    pub content: String,
}

/// Body of `POST /gists`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub public: bool,
    pub files: BTreeMap<String, NewFile>,
}

impl CreateRequest {
    pub fn new(public: bool) -> Self {
        Self {
            public,
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(
            name.into(),
            NewFile {
                content: content.into(),
            },
        );
        self
    }
}

/// Body of comment create/edit requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRequest {
    pub body: String,
}

/// Filter for the authenticated gist listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GistFilter {
    /// All gists of the authenticated user.
    Mine,
    Public,
    Starred,
    /// A single gist by id.
    Id(String),
}

impl GistFilter {
    /// API path of the listing.
    pub fn endpoint(&self) -> String {
        match self {
            GistFilter::Mine => "/gists".to_string(),
            GistFilter::Public => "/gists/public".to_string(),
            GistFilter::Starred => "/gists/starred".to_string(),
            GistFilter::Id(id) => format!("/gists/{}", urlencoding::encode(id)),
        }
    }
}
