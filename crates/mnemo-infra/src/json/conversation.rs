//! JSON-file implementation of [`ConversationRepository`].

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use mnemo_core::repository::conversation::ConversationRepository;
use mnemo_types::conversation::Conversation;
use mnemo_types::error::RepositoryError;
use mnemo_types::llm::Message;

use super::RecordDir;

/// Stores each conversation as `{root}/conversations/{id}.json`.
#[derive(Debug)]
pub struct JsonConversationRepository {
    records: RecordDir,
}

impl JsonConversationRepository {
    pub async fn open(root: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            records: RecordDir::open(root.join("conversations")).await?,
        })
    }
}

impl ConversationRepository for JsonConversationRepository {
    async fn load(&self, id: &str) -> Result<Conversation, RepositoryError> {
        let lock = self.records.lock(id)?;
        let _guard = lock.read().await;
        let conversation: Conversation = self.records.read(id).await?;
        debug!(id, message_count = conversation.messages.len(), "conversation loaded");
        Ok(conversation)
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        let lock = self.records.lock(&conversation.id)?;
        let _guard = lock.write().await;
        let mut stamped = conversation.clone();
        stamped.updated_at = Utc::now();
        self.records.write(&stamped.id, &stamped).await?;
        debug!(id = %stamped.id, message_count = stamped.messages.len(), "conversation saved");
        Ok(())
    }

    /// Ids only; reads no record, so no per-record lock is taken.
    async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        self.records.ids().await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.records.delete(id).await?;
        info!(id, "conversation deleted");
        Ok(())
    }

    async fn append_messages(&self, id: &str, messages: &[Message]) -> Result<(), RepositoryError> {
        let lock = self.records.lock(id)?;
        let _guard = lock.write().await;
        let mut conversation = match self.records.read::<Conversation>(id).await {
            Ok(conversation) => conversation,
            Err(RepositoryError::NotFound) => Conversation::new(id),
            Err(e) => return Err(e),
        };
        conversation.messages.extend_from_slice(messages);
        conversation.updated_at = Utc::now();
        self.records.write(id, &conversation).await?;
        debug!(
            id,
            appended = messages.len(),
            message_count = conversation.messages.len(),
            "messages appended"
        );
        Ok(())
    }

    async fn compact(
        &self,
        id: &str,
        removed_prefix_len: usize,
        summary: &str,
    ) -> Result<(), RepositoryError> {
        let lock = self.records.lock(id)?;
        let _guard = lock.write().await;
        let mut conversation: Conversation = self.records.read(id).await?;
        let cut = removed_prefix_len.min(conversation.messages.len());
        conversation.messages.drain(..cut);
        conversation.summary = summary.to_string();
        conversation.updated_at = Utc::now();
        self.records.write(id, &conversation).await?;
        info!(
            id,
            removed = cut,
            remaining = conversation.messages.len(),
            "conversation compacted"
        );
        Ok(())
    }
}
