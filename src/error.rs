// Error types for the gist client.
// Covers transport failures, metadata fetch/decode failures, and file set validation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GistError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired credentials")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata could not be retrieved. Nothing is cached, so a later read retries.
    #[error("Failed to fetch metadata for gist {id}: {source}")]
    MetadataFetch {
        id: String,
        #[source]
        source: Box<GistError>,
    },

    /// The payload arrived but does not map onto the gist model.
    #[error("Failed to decode gist metadata: {0}")]
    MetadataDecode(String),

    /// One file of the file set could not be fetched; the whole read fails.
    #[error("Failed to fetch file {file:?} of gist {id}: {source}")]
    FileFetch {
        id: String,
        file: String,
        #[source]
        source: Box<GistError>,
    },

    /// A response body was not valid UTF-8, e.g. a binary file.
    #[error("Response from {0} is not valid UTF-8")]
    NonUtf8Body(String),

    #[error("File {0:?} already exists")]
    DuplicateFile(String),

    #[error("File {0:?} does not exist")]
    FileNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl GistError {
    /// Wrap an underlying cause as a metadata fetch failure for `id`.
    pub fn metadata_fetch(id: impl Into<String>, source: GistError) -> Self {
        GistError::MetadataFetch {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an underlying cause as a content fetch failure for one file.
    pub fn file_fetch(id: impl Into<String>, file: impl Into<String>, source: GistError) -> Self {
        GistError::FileFetch {
            id: id.into(),
            file: file.into(),
            source: Box::new(source),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        GistError::MetadataDecode(message.into())
    }
}

pub type Result<T> = std::result::Result<T, GistError>;
