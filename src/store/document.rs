//! Durable document backends: one document per collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// The persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Reminders,
    Alarms,
    Contacts,
    Todos,
    Notes,
    Meetings,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Reminders,
        Collection::Alarms,
        Collection::Contacts,
        Collection::Todos,
        Collection::Notes,
        Collection::Meetings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reminders => "reminders",
            Self::Alarms => "alarms",
            Self::Contacts => "contacts",
            Self::Todos => "todos",
            Self::Notes => "notes",
            Self::Meetings => "meetings",
        }
    }

    /// File backing this collection. Notes are plain text lines.
    pub fn file_name(&self) -> String {
        match self {
            Self::Notes => "notes.txt".to_string(),
            other => format!("{}.json", other.name()),
        }
    }
}

/// Backend-agnostic storage for whole-collection JSON documents and
/// append-only text collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a collection. `Ok(None)` when nothing has been written yet.
    async fn read_collection(
        &self,
        collection: Collection,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    /// Overwrite a collection with `doc`.
    async fn write_collection(
        &self,
        collection: Collection,
        doc: &serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Read every line of a text collection.
    async fn read_lines(&self, collection: Collection) -> Result<Vec<String>, StoreError>;

    /// Append one line to a text collection.
    async fn append_line(&self, collection: Collection, line: &str) -> Result<(), StoreError>;
}

/// One file per collection under a data directory.
pub struct JsonFileStore {
    base_path: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `base_path`. The directory is created on first write.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve the file backing a collection.
    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.base_path.join(collection.file_name())
    }

    async fn ensure_dir(&self, collection: Collection) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| io_error(collection, e))
    }
}

fn io_error(collection: Collection, source: std::io::Error) -> StoreError {
    StoreError::Io {
        collection: collection.name().to_string(),
        source,
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read_collection(
        &self,
        collection: Collection,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(collection, e))?;
        let doc = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            collection: collection.name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(doc))
    }

    async fn write_collection(
        &self,
        collection: Collection,
        doc: &serde_json::Value,
    ) -> Result<(), StoreError> {
        self.ensure_dir(collection).await?;
        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(doc)?;
        fs::write(&tmp, body)
            .await
            .map_err(|e| io_error(collection, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(collection, e))?;
        Ok(())
    }

    async fn read_lines(&self, collection: Collection) -> Result<Vec<String>, StoreError> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(collection, e))?;
        Ok(raw
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(String::from)
            .collect())
    }

    async fn append_line(&self, collection: Collection, line: &str) -> Result<(), StoreError> {
        self.ensure_dir(collection).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(collection))
            .await
            .map_err(|e| io_error(collection, e))?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| io_error(collection, e))?;
        file.flush().await.map_err(|e| io_error(collection, e))?;
        Ok(())
    }
}

/// In-process document store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<Collection, String>>,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with raw text (e.g. to simulate a corrupt file).
    pub fn seed_raw(&self, collection: Collection, raw: impl Into<String>) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert(collection, raw.into());
        }
    }

    /// Make every subsequent write fail with an I/O error, as a full disk would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, collection: Collection) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io_error(
                collection,
                std::io::Error::other("writes disabled"),
            ));
        }
        Ok(())
    }

    /// Raw text currently stored for a collection.
    pub fn raw(&self, collection: Collection) -> Option<String> {
        self.docs.lock().ok()?.get(&collection).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read_collection(
        &self,
        collection: Collection,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let Some(raw) = self.raw(collection) else {
            return Ok(None);
        };
        let doc = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            collection: collection.name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(doc))
    }

    async fn write_collection(
        &self,
        collection: Collection,
        doc: &serde_json::Value,
    ) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        let body = serde_json::to_string_pretty(doc)?;
        self.seed_raw(collection, body);
        Ok(())
    }

    async fn read_lines(&self, collection: Collection) -> Result<Vec<String>, StoreError> {
        Ok(self
            .raw(collection)
            .map(|raw| {
                raw.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append_line(&self, collection: Collection, line: &str) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        if let Ok(mut docs) = self.docs.lock() {
            let entry = docs.entry(collection).or_default();
            entry.push_str(line);
            entry.push('\n');
        }
        Ok(())
    }
}
