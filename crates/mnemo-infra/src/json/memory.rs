//! JSON-file implementation of [`MemoryRepository`].

use std::path::Path;

use tracing::debug;

use mnemo_core::repository::memory::MemoryRepository;
use mnemo_types::error::RepositoryError;
use mnemo_types::memory::MemoryItem;

use super::RecordDir;

/// Stores each memory as `{root}/memory/{id}.json`.
#[derive(Debug)]
pub struct JsonMemoryRepository {
    records: RecordDir,
}

impl JsonMemoryRepository {
    pub async fn open(root: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            records: RecordDir::open(root.join("memory")).await?,
        })
    }
}

impl MemoryRepository for JsonMemoryRepository {
    async fn save(&self, item: &MemoryItem) -> Result<(), RepositoryError> {
        let lock = self.records.lock(&item.id)?;
        let _guard = lock.write().await;
        self.records.write(&item.id, item).await?;
        debug!(id = %item.id, memory_type = %item.memory_type, "memory saved");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<MemoryItem, RepositoryError> {
        let lock = self.records.lock(id)?;
        let _guard = lock.read().await;
        self.records.read(id).await
    }

    /// Oldest first.
    async fn list(&self) -> Result<Vec<MemoryItem>, RepositoryError> {
        let mut items: Vec<MemoryItem> = self.records.read_all().await?;
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.records.delete(id).await?;
        debug!(id, "memory deleted");
        Ok(())
    }
}
