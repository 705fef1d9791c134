// Gist resource with lazily fetched, cached metadata and files.
// Each metadata getter goes through one single-flight load; `reset` re-arms it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::MappedMutexGuard;

use crate::cache::Lazy;
use crate::config::Credentials;
use crate::error::{GistError, Result};
use crate::github::decode::{decode_metadata, payload_id};
use crate::github::{Comment, Fork, GistClient, GistMetadata, HistoryEntry, Payload};

use super::files::FileSet;
use super::upload::{SaveOutcome, build_update};

/// A remote gist. Nothing is fetched until a metadata-dependent getter runs.
///
/// Two instances for the same id share no cache state.
pub struct Gist {
    id: String,
    client: GistClient,
    credentials: Option<Credentials>,
    /// Payload supplied at construction, decoded instead of fetching.
    seed: Option<Payload>,
    meta: Lazy<Arc<GistMetadata>>,
    files: Lazy<FileSet>,
    pending_description: Option<String>,
}

impl std::fmt::Debug for Gist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<gist {}>", self.id)
    }
}

impl Gist {
    /// A gist known only by id.
    pub fn new(client: GistClient, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client,
            credentials: None,
            seed: None,
            meta: Lazy::new(),
            files: Lazy::new(),
            pending_description: None,
        }
    }

    /// A gist built from an already fetched payload, e.g. a listing entry.
    pub fn from_payload(client: GistClient, payload: Payload) -> Result<Self> {
        let id = payload_id(&payload)?;
        let mut gist = Self::new(client, id);
        gist.seed = Some(payload);
        Ok(gist)
    }

    /// Server identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set per-resource credentials, used ahead of the process default.
    pub fn auth(&mut self, username: impl Into<String>, token: impl Into<String>) {
        self.credentials = Some(Credentials::new(username, token));
    }

    pub(crate) fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    fn read_credentials(&self) -> Option<Credentials> {
        self.client.resolve_credentials(None, self.credentials.as_ref())
    }

    // Derived URLs. Pure functions of the id.

    /// Web page of the gist.
    pub fn url(&self) -> String {
        format!("{}/{}", self.client.config().web_base, self.id)
    }

    /// Script embed URL.
    pub fn embed_url(&self) -> String {
        format!("{}.js", self.url())
    }

    /// Full-page embed URL.
    pub fn epic_embed_url(&self) -> String {
        format!("{}.pibb", self.url())
    }

    /// JSON rendering of the gist page.
    pub fn json_url(&self) -> String {
        format!("{}.json", self.url())
    }

    /// API resource URL.
    pub fn api_url(&self) -> String {
        self.client.api_url(&format!("/gists/{}", urlencoding::encode(&self.id)))
    }

    /// Derived raw content URL of one file.
    pub fn raw_url(&self, file: &str) -> String {
        format!("{}/raw/{}", self.url(), urlencoding::encode(file))
    }

    // Metadata

    /// Cached metadata, loading it on first use.
    pub async fn metadata(&self) -> Result<Arc<GistMetadata>> {
        let meta = self.meta.get_or_try_load(|| self.load_metadata()).await?;
        Ok(Arc::clone(&meta))
    }

    async fn load_metadata(&self) -> Result<Arc<GistMetadata>> {
        if let Some(payload) = &self.seed {
            tracing::debug!(gist = %self.id, "decoding supplied metadata");
            return decode_metadata(payload).map(Arc::new);
        }

        tracing::debug!(gist = %self.id, "fetching metadata");
        let payload = self
            .client
            .fetch_metadata(&self.id, self.read_credentials())
            .await
            .map_err(|e| GistError::metadata_fetch(&self.id, e))?;
        decode_metadata(&payload).map(Arc::new)
    }

    /// Owner login.
    pub async fn owner(&self) -> Result<Option<String>> {
        Ok(self.metadata().await?.owner.clone())
    }

    /// Description as last fetched; staged edits are not reflected.
    pub async fn description(&self) -> Result<Option<String>> {
        Ok(self.metadata().await?.description.clone())
    }

    /// Creation time, if the payload carried one.
    pub async fn created_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.metadata().await?.created_at)
    }

    /// Whether the gist is public.
    pub async fn is_public(&self) -> Result<bool> {
        Ok(self.metadata().await?.public)
    }

    /// Canonical file names in server order.
    pub async fn file_names(&self) -> Result<Vec<String>> {
        Ok(self.metadata().await?.file_names.clone())
    }

    /// Comments embedded in the metadata payload.
    pub async fn comments(&self) -> Result<Vec<Comment>> {
        Ok(self.metadata().await?.comments.clone())
    }

    /// Forks embedded in the metadata payload.
    pub async fn forks(&self) -> Result<Vec<Fork>> {
        Ok(self.metadata().await?.forks.clone())
    }

    /// Revision history embedded in the metadata payload.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.metadata().await?.history.clone())
    }

    /// An unmodeled payload field.
    pub async fn extra(&self, key: &str) -> Result<Option<String>> {
        Ok(self.metadata().await?.extra(key).map(str::to_string))
    }

    // Files

    async fn file_set(&self) -> Result<MappedMutexGuard<'_, FileSet>> {
        self.files.get_or_try_load(|| self.load_files()).await
    }

    /// Fetch every file; one failure fails the whole load and caches nothing.
    async fn load_files(&self) -> Result<FileSet> {
        let meta = self.metadata().await?;
        let credentials = self.read_credentials();
        let mut fetched = Vec::with_capacity(meta.file_names.len());

        for name in &meta.file_names {
            let url = meta
                .raw_urls
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.raw_url(name));
            let content = self
                .client
                .fetch_raw(&url, credentials.clone())
                .await
                .map_err(|e| GistError::file_fetch(&self.id, name, e))?;
            fetched.push((name.clone(), content));
        }

        tracing::debug!(gist = %self.id, files = fetched.len(), "fetched file contents");
        Ok(FileSet::from_server(fetched))
    }

    /// Snapshot of display name -> content.
    pub async fn files(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.file_set().await?.contents().clone())
    }

    /// Content of one file by display name.
    pub async fn file(&self, name: &str) -> Result<Option<String>> {
        Ok(self.file_set().await?.get(name).map(str::to_string))
    }

    /// Add a file locally; fails if the display name is taken.
    pub async fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) -> Result<()> {
        self.file_set().await?.add(name, content)
    }

    /// Rename a file locally, keeping its canonical name.
    pub async fn rename_file(&mut self, old_name: &str, new_name: impl Into<String>) -> Result<()> {
        self.file_set().await?.rename(old_name, new_name)
    }

    /// Delete a file locally; `save` removes it from the server.
    pub async fn delete_file(&mut self, name: &str) -> Result<()> {
        self.file_set().await?.delete(name)
    }

    /// Stage a new description for the next `save`; `None` drops a staged edit.
    pub fn set_description(&mut self, description: Option<String>) {
        self.pending_description = description;
    }

    // Cache control and upload

    /// Drop cached metadata, files, and any supplied payload.
    pub async fn reset(&mut self) {
        self.seed = None;
        self.files.clear().await;
        self.meta.clear().await;
        tracing::debug!(gist = %self.id, "cache reset");
    }

    /// Upload local changes with per-resource or default credentials.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        self.save_with(None).await
    }

    /// Upload local changes; `credentials` overrides every other layer.
    ///
    /// Non-2xx statuses come back in the outcome with caches untouched.
    pub async fn save_with(&mut self, credentials: Option<&Credentials>) -> Result<SaveOutcome> {
        let credentials = self
            .client
            .resolve_credentials(credentials, self.credentials.as_ref());
        let request = {
            let mut files = self.file_set().await?;
            build_update(&mut files, self.pending_description.clone())
        };

        let response = self
            .client
            .update_gist(&self.id, &request, credentials)
            .await?;
        let outcome = SaveOutcome::from(response);

        if outcome.is_ok() {
            tracing::info!(gist = %self.id, files = request.files.len(), "saved gist");
            self.pending_description = None;
            self.reset().await;
        } else {
            tracing::warn!(gist = %self.id, status = outcome.status, "gist save rejected");
        }
        Ok(outcome)
    }
}
