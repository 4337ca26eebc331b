//! Conversation repository trait definition.
//!
//! The infrastructure layer (mnemo-infra) implements this with one JSON file
//! per conversation. Every mutation runs under the record's exclusive lock;
//! loads and lists take the shared lock.

use mnemo_types::conversation::Conversation;
use mnemo_types::error::RepositoryError;
use mnemo_types::llm::Message;

/// Repository trait for conversation persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ConversationRepository: Send + Sync {
    /// Load a conversation. Returns `RepositoryError::NotFound` when absent.
    fn load(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Replace the stored conversation wholesale (last write wins).
    fn save(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All stored conversation ids, sorted.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Delete a conversation. Returns `NotFound` when absent.
    fn delete(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append messages to a conversation in one read-modify-write, creating
    /// the conversation when it does not exist yet.
    fn append_messages(
        &self,
        id: &str,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Drop the first `removed_prefix_len` messages and set `summary`, in one
    /// read-modify-write.
    ///
    /// Messages appended after the prefix was read by the summarizer are kept.
    fn compact(
        &self,
        id: &str,
        removed_prefix_len: usize,
        summary: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
