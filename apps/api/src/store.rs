//! Metadata store: `document_id -> ResumeRecord`, persisted as one JSON object on disk.
//!
//! Every write is a whole-file read-modify-write. Upserts inside this process are
//! serialized; separate processes sharing the file still race (last writer wins).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::resume::ResumeRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metadata file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keyed persistence for parsed resumes. Swap the backing store without touching callers.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn upsert(&self, document_id: &str, record: &ResumeRecord) -> Result<(), StoreError>;

    /// `None` when the id is unknown or the backing data cannot be read.
    async fn get(&self, document_id: &str) -> Option<ResumeRecord>;
}

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Ensures the parent directory exists and seeds `{}` when the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|source| io_error(&path, source))?
        {
            tokio::fs::write(&path, "{}")
                .await
                .map_err(|source| io_error(&path, source))?;
            info!(path = %path.display(), "Initialized empty metadata file");
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole object. A missing or undecodable file is an empty store.
    async fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => return Err(io_error(&self.path, source)),
        };

        match serde_json::from_str::<Map<String, Value>>(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), "Metadata file corrupted, starting fresh: {e}");
                Ok(Map::new())
            }
        }
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    async fn upsert(&self, document_id: &str, record: &ResumeRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        all.insert(document_id.to_string(), serde_json::to_value(record)?);

        let encoded = serde_json::to_string_pretty(&Value::Object(all))?;
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|source| io_error(&self.path, source))?;

        info!(document_id, "Saved metadata");
        Ok(())
    }

    async fn get(&self, document_id: &str) -> Option<ResumeRecord> {
        let mut all = match self.read_all().await {
            Ok(all) => all,
            Err(e) => {
                error!(document_id, "Failed to load metadata: {e}");
                return None;
            }
        };

        let value = all.remove(document_id)?;
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                error!(document_id, "Stored record does not decode: {e}");
                None
            }
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
