//! JSON file storage for mnemo.
//!
//! Implements the repository traits from `mnemo-core` with one
//! pretty-printed JSON file per record. Writes go to a temp file in the same
//! directory and are renamed into place, so a crash never leaves a
//! half-written record behind.
//!
//! Layout under the storage root:
//! ```text
//! {root}/conversations/{id}.json
//! {root}/memory/{id}.json
//! {root}/skills/{id}.json
//! ```

pub mod conversation;
pub mod memory;
pub mod skill;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use mnemo_core::repository::validate_record_id;
use mnemo_types::error::RepositoryError;

pub use conversation::JsonConversationRepository;
pub use memory::JsonMemoryRepository;
pub use skill::JsonSkillRepository;

const EXTENSION: &str = "json";

/// One directory of JSON records plus a lock per record id.
///
/// Callers hold the record's lock across a read-modify-write; the file
/// helpers themselves do no locking.
#[derive(Debug)]
pub(crate) struct RecordDir {
    dir: PathBuf,
    locks: DashMap<String, Arc<RwLock<()>>>,
}

impl RecordDir {
    /// Open (creating if needed) the record directory.
    pub(crate) async fn open(dir: PathBuf) -> Result<Self, RepositoryError> {
        tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;
        tracing::debug!(path = %dir.display(), "record directory ready");
        Ok(Self {
            dir,
            locks: DashMap::new(),
        })
    }

    /// The lock guarding `id`. Validates the id first.
    pub(crate) fn lock(&self, id: &str) -> Result<Arc<RwLock<()>>, RepositoryError> {
        validate_record_id(id)?;
        Ok(self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone())
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    pub(crate) async fn read<T: DeserializeOwned>(&self, id: &str) -> Result<T, RepositoryError> {
        read_file(&self.path(id)).await
    }

    pub(crate) async fn write<T: Serialize>(&self, id: &str, record: &T) -> Result<(), RepositoryError> {
        let data = serde_json::to_vec_pretty(record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let tmp = self.dir.join(format!(".{id}.{}.tmp", uuid::Uuid::now_v7()));
        if let Err(e) = tokio::fs::write(&tmp, &data).await {
            return Err(io_error(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, self.path(id)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(e));
        }
        Ok(())
    }

    pub(crate) async fn remove(&self, id: &str) -> Result<(), RepositoryError> {
        tokio::fs::remove_file(self.path(id)).await.map_err(io_error)
    }

    /// Remove `id` under its write lock, then drop the lock entry unless
    /// another caller still holds it.
    pub(crate) async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let lock = self.lock(id)?;
        let result = {
            let _guard = lock.write().await;
            self.remove(id).await
        };
        drop(lock);
        self.locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Ids of every record file, sorted. Temp files are skipped.
    ///
    /// A directory listing touches no record contents, so no per-record lock
    /// is taken.
    pub(crate) async fn ids(&self) -> Result<Vec<String>, RepositoryError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_error)?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            ids.push(stem.to_string());
        }
        ids.sort();
        Ok(ids)
    }

    /// Every readable record. Unreadable files are skipped with a warning.
    pub(crate) async fn read_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, RepositoryError> {
        let mut records = Vec::new();
        for id in self.ids().await? {
            match self.read(&id).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(id, dir = %self.dir.display(), error = %e, "skipping unreadable record");
                }
            }
        }
        Ok(records)
    }
}

async fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, RepositoryError> {
    let data = tokio::fs::read(path).await.map_err(io_error)?;
    serde_json::from_slice(&data).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn io_error(e: std::io::Error) -> RepositoryError {
    if e.kind() == ErrorKind::NotFound {
        RepositoryError::NotFound
    } else {
        RepositoryError::Io(e.to_string())
    }
}
