//! Persistence of the installed revision marker.
//!
//! The [`VersionRecord`] is stored as a small JSON document with the field
//! names `commit`, `lastUpdate` and `version`. Where it lives depends on the
//! host: [`FileStore`] keeps `version.json` in the install directory,
//! [`KeyedStore`] keeps it under a key of a shared JSON document in the user
//! data directory, and [`MemoryStore`] keeps it in process.
//!
//! [`VersionStore::load`] never fails. A missing or unreadable record is
//! replaced by [`VersionRecord::default`], which is written back immediately
//! so the next load returns the same values.

use crate::constants::DEFAULT_SEMANTIC_VERSION;
use crate::core::file_error::{FileOperation, FileOperationError, FileResultExt};
use crate::core::{Result, UpdaterError};
use crate::utils::fs::{read_json_file, safe_write, write_json_file};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// The locally installed revision marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Revision (commit sha) of the last applied update. `None` before the first one.
    #[serde(rename = "commit", default)]
    pub revision_id: Option<String>,
    /// RFC 3339 timestamp of the last applied update.
    #[serde(rename = "lastUpdate", default)]
    pub last_update: Option<String>,
    /// Semantic version of the install.
    #[serde(rename = "version", default = "default_semantic_version")]
    pub semantic_version: String,
}

fn default_semantic_version() -> String {
    DEFAULT_SEMANTIC_VERSION.to_string()
}

impl Default for VersionRecord {
    fn default() -> Self {
        Self {
            revision_id: None,
            last_update: None,
            semantic_version: default_semantic_version(),
        }
    }
}

impl VersionRecord {
    /// The semantic version parsed with `semver`, if it is well formed.
    pub fn parsed_version(&self) -> Option<semver::Version> {
        semver::Version::parse(self.semantic_version.trim_start_matches('v')).ok()
    }
}

/// Durable location for the serialized version record.
pub trait PersistentStore {
    /// Read the raw record. `Ok(None)` means nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the raw record.
    fn write(&self, contents: &str) -> Result<()>;
}

/// Record stored as a JSON file, normally `version.json` in the install directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistentStore for FileStore {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FileOperationError::new(
                FileOperation::Read,
                &self.path,
                "loading version record",
                e,
            )
            .into()),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        safe_write(&self.path, contents)?;
        Ok(())
    }
}

/// Record stored under one key of a JSON object shared with other keys.
///
/// Values are kept as strings, so the document looks like
/// `{"gameVersion": "{\"commit\": ...}"}`.
#[derive(Debug, Clone)]
pub struct KeyedStore {
    path: PathBuf,
    key: String,
}

impl KeyedStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        read_json_file(&self.path)
    }

    /// Where an unreadable document is moved before it is rewritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }
}

impl PersistentStore for KeyedStore {
    fn read(&self) -> Result<Option<String>> {
        let document = self.read_document()?;
        Ok(document.get(&self.key).map(|value| match value {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }))
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "Store {} is unreadable ({}); moving it to {}",
                    self.path.display(),
                    e,
                    backup.display()
                );
                std::fs::rename(&self.path, &backup).with_file_context(
                    FileOperation::Rename,
                    &self.path,
                    "moving unreadable store aside",
                )?;
                Map::new()
            }
        };
        document.insert(self.key.clone(), Value::String(contents.to_string()));
        write_json_file(&self.path, &document, true)
    }
}

/// In-process store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Current raw contents.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or_default()
    }
}

impl PersistentStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| std::io::Error::other("memory store lock poisoned"))?;
        *slot = Some(contents.to_string());
        Ok(())
    }
}

/// Loads and saves the [`VersionRecord`] through a [`PersistentStore`].
#[derive(Debug, Clone)]
pub struct VersionStore<S> {
    store: S,
}

impl<S: PersistentStore> VersionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the record, falling back to the default record.
    ///
    /// The fallback is persisted right away (best effort) so that subsequent
    /// loads are stable.
    pub fn load(&self) -> VersionRecord {
        match self.store.read() {
            Ok(Some(raw)) => match serde_json::from_str::<VersionRecord>(&raw) {
                Ok(record) => return record,
                Err(e) => warn!("Stored version record is corrupt, resetting it: {}", e),
            },
            Ok(None) => debug!("No version record found, creating default"),
            Err(e) => warn!("Failed to read version record, using default: {}", e),
        }

        let record = VersionRecord::default();
        if let Err(e) = self.save(&record) {
            warn!("Failed to persist default version record: {}", e);
        }
        record
    }

    /// Persist the record as pretty-printed JSON.
    pub fn save(&self, record: &VersionRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record).map_err(|e| UpdaterError::Parse {
            what: "version record".to_string(),
            reason: e.to_string(),
        })?;
        self.store.write(&json)
    }
}
