//! Memory repository trait definition.

use mnemo_types::error::RepositoryError;
use mnemo_types::memory::MemoryItem;

/// Repository trait for long-term memory items.
pub trait MemoryRepository: Send + Sync {
    /// Insert or replace a memory item keyed by its id.
    fn save(
        &self,
        item: &MemoryItem,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load one item. Returns `RepositoryError::NotFound` when absent.
    fn load(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<MemoryItem, RepositoryError>> + Send;

    /// Every stored item, oldest first.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryItem>, RepositoryError>> + Send;

    /// Delete one item. Returns `NotFound` when absent.
    fn delete(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
