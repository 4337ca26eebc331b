//! Context/Memory manager.
//!
//! Builds each turn's input context (recalled memories, carried-over summary,
//! sliding window, new user message) and drives background summarization
//! and memory extraction. At most one background unit runs per
//! conversation id; the lease is held from spawn until the unit finishes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use mnemo_types::config::ContextSettings;
use mnemo_types::conversation::Conversation;
use mnemo_types::error::{MemoryError, RepositoryError};
use mnemo_types::llm::Message;
use mnemo_types::memory::{MANUAL_RELEVANCE, MemoryItem, MemoryType};

use super::extractor::MemoryExtractor;
use super::recall::{recall, recall_message};
use super::summarizer::ContextSummarizer;
use super::window::select_window;
use crate::llm::box_provider::BoxLlmProvider;
use crate::repository::conversation::ConversationRepository;
use crate::repository::memory::MemoryRepository;

/// Default bound on each background provider call.
pub const BACKGROUND_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning for context assembly and background compaction.
#[derive(Debug, Clone)]
pub struct MemorySettings {
    /// Model used for summarization and extraction calls.
    pub model: String,
    pub max_messages: usize,
    pub max_tokens: usize,
    /// Stored message count at which compaction is triggered.
    pub summarize_when: usize,
    pub background_timeout: Duration,
}

impl MemorySettings {
    pub fn from_context(model: impl Into<String>, context: &ContextSettings) -> Self {
        Self {
            model: model.into(),
            max_messages: context.max_messages,
            max_tokens: context.max_tokens,
            summarize_when: context.summarize_when,
            background_timeout: BACKGROUND_CALL_TIMEOUT,
        }
    }
}

/// Per-conversation single-flight lease. Released on drop.
struct SummarizationLease {
    in_flight: Arc<DashMap<String, ()>>,
    conversation_id: String,
}

impl SummarizationLease {
    fn try_acquire(in_flight: &Arc<DashMap<String, ()>>, conversation_id: &str) -> Option<Self> {
        if in_flight.insert(conversation_id.to_string(), ()).is_some() {
            return None;
        }
        Some(Self {
            in_flight: Arc::clone(in_flight),
            conversation_id: conversation_id.to_string(),
        })
    }
}

impl Drop for SummarizationLease {
    fn drop(&mut self) {
        self.in_flight.remove(&self.conversation_id);
    }
}

/// Owned handles a background unit needs after the triggering turn is gone.
struct BackgroundUnit<C, M> {
    conversations: Arc<C>,
    memories: Arc<M>,
    provider: Arc<BoxLlmProvider>,
    settings: MemorySettings,
    conversation_id: String,
}

impl<C, M> BackgroundUnit<C, M>
where
    C: ConversationRepository,
    M: MemoryRepository,
{
    /// Summarize the stored prefix, compact, then extract memories from it.
    async fn run(self) -> Result<(), MemoryError> {
        let started = Instant::now();
        let conversation = self.conversations.load(&self.conversation_id).await?;
        if conversation.messages.len() < self.settings.summarize_when {
            debug!("conversation shrank below threshold; skipping summarization");
            return Ok(());
        }

        let keep = ContextSummarizer::keep_recent_for(self.settings.summarize_when);
        let (to_summarize, _) =
            ContextSummarizer::select_messages_to_summarize(&conversation.messages, keep);
        if to_summarize.is_empty() {
            return Ok(());
        }

        info!(
            message_count = conversation.messages.len(),
            summarizing = to_summarize.len(),
            keep,
            "starting conversation summarization"
        );

        let summary = tokio::time::timeout(
            self.settings.background_timeout,
            ContextSummarizer::summarize(
                &self.provider,
                to_summarize,
                &conversation.summary,
                &self.settings.model,
            ),
        )
        .await
        .map_err(|_| MemoryError::Summarization("timed out".to_string()))?
        .map_err(|e| MemoryError::Summarization(e.to_string()))?;

        if summary.is_empty() {
            return Err(MemoryError::Summarization(
                "provider returned an empty summary".to_string(),
            ));
        }

        self.conversations
            .compact(&self.conversation_id, to_summarize.len(), &summary)
            .await?;

        info!(
            summary_len = summary.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "summarization completed"
        );

        // Extraction failures are independent of the compaction that already happened.
        if let Err(e) = self.extract(to_summarize).await {
            warn!(error = %e, "memory extraction failed");
        }
        Ok(())
    }

    async fn extract(&self, batch: &[Message]) -> Result<(), MemoryError> {
        let items = tokio::time::timeout(
            self.settings.background_timeout,
            MemoryExtractor::extract(&self.provider, batch, &self.settings.model),
        )
        .await
        .map_err(|_| MemoryError::Extraction("timed out".to_string()))?
        .map_err(|e| MemoryError::Extraction(e.to_string()))?;

        let mut stored = 0usize;
        for item in &items {
            match self.memories.save(item).await {
                Ok(()) => stored += 1,
                Err(e) => error!(error = %e, memory_type = %item.memory_type, "failed to save memory"),
            }
        }
        if stored > 0 {
            info!(count = stored, "memories extracted");
        }
        Ok(())
    }
}

/// Builds turn context and owns background compaction.
pub struct MemoryManager<C, M> {
    conversations: Arc<C>,
    memories: Arc<M>,
    provider: Arc<BoxLlmProvider>,
    settings: MemorySettings,
    in_flight: Arc<DashMap<String, ()>>,
    tracker: TaskTracker,
}

impl<C, M> MemoryManager<C, M>
where
    C: ConversationRepository + 'static,
    M: MemoryRepository + 'static,
{
    pub fn new(
        conversations: Arc<C>,
        memories: Arc<M>,
        provider: Arc<BoxLlmProvider>,
        settings: MemorySettings,
    ) -> Self {
        Self {
            conversations,
            memories,
            provider,
            settings,
            in_flight: Arc::new(DashMap::new()),
            tracker: TaskTracker::new(),
        }
    }

    pub fn settings(&self) -> &MemorySettings {
        &self.settings
    }

    /// Assemble the turn's context. The last element is always the new user
    /// message.
    ///
    /// Launches background summarization when the stored history has reached
    /// the threshold; never waits for it.
    #[tracing::instrument(
        name = "build_context",
        skip(self, conversation, user_input),
        fields(conversation_id = %conversation.id)
    )]
    pub async fn build_context(&self, conversation: &Conversation, user_input: &str) -> Vec<Message> {
        let mut context = Vec::new();

        match self.memories.list().await {
            Ok(items) => {
                let recalled = recall(&items, user_input);
                if let Some(message) = recall_message(&recalled) {
                    debug!(count = recalled.len(), "relevant memories found");
                    context.push(message);
                }
            }
            Err(e) => warn!(error = %e, "memory recall skipped"),
        }

        if conversation.has_summary() {
            debug!("using conversation summary");
            context.push(Message::system(format!(
                "Previous conversation summary: {}",
                conversation.summary
            )));
        }

        let window = select_window(
            &conversation.messages,
            user_input,
            self.settings.max_tokens,
            self.settings.max_messages,
        );
        debug!(count = window.len(), "recent messages added");
        context.extend(window);
        context.push(Message::user(user_input));

        if conversation.messages.len() >= self.settings.summarize_when {
            self.spawn_summarization(&conversation.id);
        }

        context
    }

    /// Start a background unit for `conversation_id` unless one is running.
    /// Returns whether a unit was started.
    pub fn spawn_summarization(&self, conversation_id: &str) -> bool {
        let Some(lease) = SummarizationLease::try_acquire(&self.in_flight, conversation_id) else {
            debug!(conversation_id, "summarization already in flight; skipping");
            return false;
        };

        info!(
            conversation_id,
            threshold = self.settings.summarize_when,
            "summarization threshold reached, scheduling background summarization"
        );

        let unit = BackgroundUnit {
            conversations: Arc::clone(&self.conversations),
            memories: Arc::clone(&self.memories),
            provider: Arc::clone(&self.provider),
            settings: self.settings.clone(),
            conversation_id: conversation_id.to_string(),
        };
        let span = tracing::info_span!("background_summarization", conversation_id);
        self.tracker.spawn(tracing::Instrument::instrument(
            async move {
                let _lease = lease;
                if let Err(e) = unit.run().await {
                    error!(error = %e, "summarization failed");
                }
            },
            span,
        ));
        true
    }

    /// Whether a background unit currently holds the lease for `conversation_id`.
    pub fn is_summarizing(&self, conversation_id: &str) -> bool {
        self.in_flight.contains_key(conversation_id)
    }

    /// Wait for every in-flight background unit to finish.
    pub async fn drain_background(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Store a user-provided memory at full relevance.
    pub async fn add_memory(
        &self,
        content: &str,
        memory_type: MemoryType,
    ) -> Result<MemoryItem, RepositoryError> {
        let item = MemoryItem::new(content, memory_type, MANUAL_RELEVANCE);
        self.memories.save(&item).await?;
        info!(memory_type = %memory_type, content_len = content.len(), "memory added");
        Ok(item)
    }

    pub async fn list_memories(&self) -> Result<Vec<MemoryItem>, RepositoryError> {
        self.memories.list().await
    }

    pub async fn delete_memory(&self, id: &str) -> Result<(), RepositoryError> {
        self.memories.delete(id).await?;
        info!(memory_id = id, "memory deleted");
        Ok(())
    }
}
