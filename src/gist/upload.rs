// Update request building and save outcome.
// Serializes local file set state into a PATCH body keyed by canonical name.

use std::path::Path;

use crate::github::{ApiResponse, FileUpdate, UpdateRequest};

use super::files::FileSet;

const DEFAULT_EXTENSION: &str = ".txt";

/// Extension of a display name including the dot, `.txt` when there is none.
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Build the update body for the current file set.
///
/// Files lacking a rename entry get a fresh placeholder, recorded in the set.
pub fn build_update(files: &mut FileSet, description: Option<String>) -> UpdateRequest {
    let mut request = UpdateRequest {
        description,
        ..UpdateRequest::default()
    };

    let names: Vec<String> = files.names().map(str::to_string).collect();
    for name in names {
        let canonical = files.canonical_or_assign(&name);
        let content = files.get(&name).unwrap_or_default().to_string();
        request.files.insert(
            canonical,
            Some(FileUpdate {
                ext: file_extension(&name),
                filename: name,
                content,
            }),
        );
    }

    for canonical in files.deleted() {
        request
            .files
            .entry(canonical.to_string())
            .or_insert(None);
    }

    request
}

/// Result of `save`: the server's status code and response body.
///
/// Non-2xx is reported here rather than raised; retry policy is the caller's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub status: u16,
    pub body: String,
}

impl SaveOutcome {
    /// The server accepted the update (HTTP 200).
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

impl From<ApiResponse> for SaveOutcome {
    fn from(response: ApiResponse) -> Self {
        Self {
            status: response.status,
            body: response.body,
        }
    }
}
