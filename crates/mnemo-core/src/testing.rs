//! Test doubles shared by the core unit tests: a scripted provider and
//! in-memory repositories.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures_util::Stream;
use tokio::sync::RwLock;

use mnemo_types::conversation::Conversation;
use mnemo_types::error::RepositoryError;
use mnemo_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, ProviderCapabilities, StopReason,
    StreamEvent, ToolCall, Usage,
};
use mnemo_types::memory::MemoryItem;
use mnemo_types::skill::Skill;

use crate::llm::provider::LlmProvider;
use crate::repository::conversation::ConversationRepository;
use crate::repository::memory::MemoryRepository;
use crate::repository::skill::SkillRepository;

pub fn text_response(content: &str) -> CompletionResponse {
    CompletionResponse {
        id: "resp".to_string(),
        content: content.to_string(),
        tool_calls: Vec::new(),
        model: "scripted-model".to_string(),
        stop_reason: StopReason::EndTurn,
        usage: Usage::default(),
    }
}

pub fn tool_response(calls: Vec<ToolCall>) -> CompletionResponse {
    CompletionResponse {
        tool_calls: calls,
        stop_reason: StopReason::ToolUse,
        ..text_response("")
    }
}

pub type RequestLog = Arc<Mutex<Vec<CompletionRequest>>>;

/// Replays queued responses in order. Once the queue is empty it repeats
/// the fallback, or fails when there is none.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<CompletionResponse, String>>>,
    fallback: Option<Result<CompletionResponse, String>>,
    requests: RequestLog,
    delay: Option<Duration>,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<CompletionResponse, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            capabilities: ProviderCapabilities {
                streaming: true,
                tool_calling: true,
                max_context_tokens: 128_000,
                max_output_tokens: 4096,
            },
        }
    }

    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| Ok(text_response(&t.into())))
                .collect(),
        )
    }

    pub fn with_responses(responses: Vec<CompletionResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    /// Answers every call with `response`.
    pub fn always(response: CompletionResponse) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.fallback = Some(Ok(response));
        provider
    }

    /// Fails every call with a provider error.
    pub fn failing() -> Self {
        let mut provider = Self::new(Vec::new());
        provider.fallback = Some(Err("scripted failure".to_string()));
        provider
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle to every request received, kept after the provider is boxed.
    pub fn request_log(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }

    fn next(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        let scripted = self.script.lock().ok().and_then(|mut q| q.pop_front());
        match scripted.or_else(|| self.fallback.clone()) {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(LlmError::Provider { message }),
            None => Err(LlmError::Provider {
                message: "script exhausted".to_string(),
            }),
        }
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let result = self.next(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    /// Streams the next scripted text word by word.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let result = self.next(&request);
        Box::pin(async_stream::stream! {
            match result {
                Ok(response) => {
                    yield Ok(StreamEvent::Connected);
                    for chunk in response.content.split_inclusive(' ') {
                        yield Ok(StreamEvent::TextDelta { text: chunk.to_string() });
                    }
                    yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                    yield Ok(StreamEvent::Done);
                }
                Err(e) => yield Err(e),
            }
        })
    }
}

/// Conversation store backed by a map; counts whole-record writes.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    records: RwLock<HashMap<String, Conversation>>,
    writes: AtomicUsize,
}

impl InMemoryConversationRepository {
    /// Number of successful save/append/compact calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ConversationRepository for InMemoryConversationRepository {
    async fn load(&self, id: &str) -> Result<Conversation, RepositoryError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        self.records
            .write()
            .await
            .insert(conversation.id.clone(), conversation.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        let mut ids: Vec<String> = self.records.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn append_messages(&self, id: &str, messages: &[Message]) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let conversation = records
            .entry(id.to_string())
            .or_insert_with(|| Conversation::new(id));
        conversation.messages.extend_from_slice(messages);
        conversation.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn compact(
        &self,
        id: &str,
        removed_prefix_len: usize,
        summary: &str,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let conversation = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let cut = removed_prefix_len.min(conversation.messages.len());
        conversation.messages.drain(..cut);
        conversation.summary = summary.to_string();
        conversation.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Memory store preserving insertion order.
#[derive(Default)]
pub struct InMemoryMemoryRepository {
    items: RwLock<Vec<MemoryItem>>,
}

impl MemoryRepository for InMemoryMemoryRepository {
    async fn save(&self, item: &MemoryItem) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<MemoryItem, RepositoryError> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<MemoryItem>, RepositoryError> {
        Ok(self.items.read().await.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySkillRepository {
    skills: RwLock<HashMap<String, Skill>>,
}

impl SkillRepository for InMemorySkillRepository {
    async fn save(&self, skill: &Skill) -> Result<(), RepositoryError> {
        self.skills
            .write()
            .await
            .insert(skill.id.clone(), skill.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Skill>, RepositoryError> {
        let mut skills: Vec<Skill> = self.skills.read().await.values().cloned().collect();
        skills.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(skills)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.skills
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
