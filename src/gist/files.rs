// File set bookkeeping for one gist.
// Display name -> content, plus display name -> canonical (server) name.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GistError, Result};

const PLACEHOLDER_PREFIX: &str = "gistfile";

/// In-memory file set. Mutations never touch the server; `save` uploads them.
///
/// Every display name in `contents` has an entry in `renames`, and no two
/// display names map to the same canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    contents: BTreeMap<String, String>,
    renames: BTreeMap<String, String>,
    /// Canonical names the server knew when the set was loaded.
    server_names: BTreeSet<String>,
    /// Server names removed locally, uploaded as deletions.
    deleted: BTreeSet<String>,
    next_placeholder: usize,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from server files; each name is its own canonical name.
    pub fn from_server<I>(files: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut set = Self::new();
        for (name, content) in files {
            set.renames.insert(name.clone(), name.clone());
            set.server_names.insert(name.clone());
            set.contents.insert(name, content);
        }
        set
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Whether a display name is in use.
    pub fn contains(&self, name: &str) -> bool {
        self.contents.contains_key(name)
    }

    /// Content of a file by display name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.contents.get(name).map(String::as_str)
    }

    /// Display names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }

    /// Display name -> content.
    pub fn contents(&self) -> &BTreeMap<String, String> {
        &self.contents
    }

    /// Canonical name currently mapped to a display name.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.renames.get(name).map(String::as_str)
    }

    /// Server files deleted locally since the set was loaded.
    pub fn deleted(&self) -> impl Iterator<Item = &str> {
        self.deleted.iter().map(String::as_str)
    }

    /// Add a new file under a fresh `gistfile<N>` placeholder.
    ///
    /// Re-adding a deleted server file reuses its server name instead.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(GistError::DuplicateFile(name));
        }

        let canonical = match self.restore_deleted(&name) {
            Some(canonical) => canonical,
            None => self.allocate_placeholder(),
        };
        self.renames.insert(name.clone(), canonical);
        self.contents.insert(name, content.into());
        Ok(())
    }

    /// Move a file to a new display name, keeping its canonical name.
    ///
    /// Renaming onto a deleted server file takes over that server name; the
    /// file's previous server name is then deleted.
    pub fn rename(&mut self, old_name: &str, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        if !self.contains(old_name) {
            return Err(GistError::FileNotFound(old_name.to_string()));
        }
        if self.contains(&new_name) {
            return Err(GistError::DuplicateFile(new_name));
        }

        if let Some(content) = self.contents.remove(old_name) {
            self.contents.insert(new_name.clone(), content);
        }
        let previous = self.renames.remove(old_name);
        let canonical = match self.restore_deleted(&new_name) {
            Some(restored) => {
                if let Some(previous) = previous {
                    self.mark_deleted(previous);
                }
                restored
            }
            None => match previous {
                Some(canonical) => canonical,
                None => self.allocate_placeholder(),
            },
        };
        self.renames.insert(new_name, canonical);
        Ok(())
    }

    /// Remove a file and its rename entry.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if self.contents.remove(name).is_none() {
            return Err(GistError::FileNotFound(name.to_string()));
        }
        if let Some(canonical) = self.renames.remove(name) {
            self.mark_deleted(canonical);
        }
        Ok(())
    }

    fn mark_deleted(&mut self, canonical: String) {
        if self.server_names.contains(&canonical) {
            self.deleted.insert(canonical);
        }
    }

    /// Take a pending server deletion back if `name` is one.
    fn restore_deleted(&mut self, name: &str) -> Option<String> {
        self.deleted.take(name)
    }

    /// Canonical name for a display name, assigning a placeholder if it has none.
    pub fn canonical_or_assign(&mut self, name: &str) -> String {
        if let Some(canonical) = self.renames.get(name) {
            return canonical.clone();
        }
        let placeholder = self.allocate_placeholder();
        self.renames.insert(name.to_string(), placeholder.clone());
        placeholder
    }

    /// Next `gistfile<N>` not in use as a canonical name. The counter never rewinds.
    fn allocate_placeholder(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", PLACEHOLDER_PREFIX, self.next_placeholder);
            self.next_placeholder += 1;
            let taken = self.server_names.contains(&candidate)
                || self.renames.values().any(|c| *c == candidate);
            if !taken {
                return candidate;
            }
        }
    }
}
