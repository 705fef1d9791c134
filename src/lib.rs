// gistkit: client library for GitHub Gists.
// Gists load their metadata and files lazily, cache them per instance, and upload local edits on save.

pub mod cache;
pub mod config;
pub mod error;
pub mod gist;
pub mod github;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Credentials, GistConfig};
pub use error::{GistError, Result};
pub use gist::{FileSet, Gist, Gists, SaveOutcome};
pub use github::{
    ChangeStatus, Comment, CreateRequest, Fork, GistClient, GistFilter, GistMetadata,
    HistoryEntry, Transport,
};
