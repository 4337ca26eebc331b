//! Agent orchestrator: the tool-calling loop behind every conversation turn.
//!
//! A turn seeds a working message list (system prompt, memory context, user
//! input), then alternates between provider calls and tool execution until
//! the model answers with plain text or the iteration cap is hit. Only the
//! user input and the final answer are persisted; the intermediate tool
//! trace lives in the working list and is discarded with it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use mnemo_types::conversation::{Conversation, DEFAULT_CONVERSATION_ID};
use mnemo_types::error::{AgentError, RepositoryError};
use mnemo_types::llm::{CompletionRequest, CompletionResponse, Message, StreamEvent};
use mnemo_types::memory::{MemoryItem, MemoryType};
use mnemo_types::tool::ToolInvocation;

use super::prompt::{PromptEnhancer, build_system_prompt};
use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::MemoryManager;
use crate::repository::conversation::ConversationRepository;
use crate::repository::memory::MemoryRepository;
use crate::tool::ToolRegistry;
use crate::tool::shell::SHELL_TOOL_NAME;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(300);

/// Asked before each unsafe tool call; `false` aborts the whole turn.
pub type ConfirmHook = Arc<dyn Fn(&ToolInvocation) -> bool + Send + Sync>;

/// Receives answer text as it becomes available.
pub type StreamSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    pub system_prompt: String,
    pub max_iterations: usize,
    pub turn_timeout: Duration,
}

impl OrchestratorSettings {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            turn_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }
}

/// Runs conversation turns against one provider and tool registry.
pub struct Orchestrator<C, M> {
    provider: Arc<BoxLlmProvider>,
    tools: Arc<ToolRegistry>,
    memory: Arc<MemoryManager<C, M>>,
    conversations: Arc<C>,
    enhancer: Option<Arc<dyn PromptEnhancer>>,
    confirm: Option<ConfirmHook>,
    settings: OrchestratorSettings,
}

impl<C, M> Orchestrator<C, M>
where
    C: ConversationRepository + 'static,
    M: MemoryRepository + 'static,
{
    pub fn new(
        provider: Arc<BoxLlmProvider>,
        tools: Arc<ToolRegistry>,
        memory: Arc<MemoryManager<C, M>>,
        conversations: Arc<C>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            provider,
            tools,
            memory,
            conversations,
            enhancer: None,
            confirm: None,
            settings,
        }
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn PromptEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn with_confirmation(mut self, hook: ConfirmHook) -> Self {
        self.confirm = Some(hook);
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn memory(&self) -> &MemoryManager<C, M> {
        &self.memory
    }

    /// Run one turn and return the model's final answer.
    ///
    /// On success the user input and the answer are appended to the stored
    /// conversation in a single write. Every failure leaves the stored
    /// conversation exactly as it was before the turn.
    #[tracing::instrument(
        name = "converse",
        skip(self, user_input, cancel, sink),
        fields(input_len = user_input.len())
    )]
    pub async fn converse(
        &self,
        conversation_id: &str,
        user_input: &str,
        cancel: &CancellationToken,
        sink: Option<StreamSink<'_>>,
    ) -> Result<String, AgentError> {
        let conversation_id = normalize_id(conversation_id);
        let conversation = match self.conversations.load(conversation_id).await {
            Ok(conversation) => conversation,
            Err(RepositoryError::NotFound) => Conversation::new(conversation_id),
            Err(e) => return Err(e.into()),
        };

        let system_prompt = build_system_prompt(
            &self.settings.system_prompt,
            user_input,
            self.enhancer.as_deref(),
        );
        let mut messages = vec![Message::system(system_prompt)];
        messages.extend(self.memory.build_context(&conversation, user_input).await);

        let deadline = Instant::now() + self.settings.turn_timeout;
        let started = std::time::Instant::now();

        let answer = if self.tools.is_empty() {
            self.stream_answer(messages, cancel, deadline, sink).await?
        } else {
            let answer = self.tool_loop(messages, cancel, deadline).await?;
            if let Some(sink) = sink {
                sink(&answer);
            }
            answer
        };

        self.conversations
            .append_messages(
                conversation_id,
                &[Message::user(user_input), Message::assistant(answer.clone())],
            )
            .await?;

        info!(
            conversation_id,
            answer_len = answer.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "turn completed"
        );
        Ok(answer)
    }

    async fn tool_loop(
        &self,
        mut messages: Vec<Message>,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<String, AgentError> {
        let definitions = self.tools.definitions();

        for iteration in 1..=self.settings.max_iterations {
            let request = CompletionRequest::new(&self.settings.model, messages.clone())
                .with_tools(definitions.clone());
            let response = self.complete(&request, iteration, cancel, deadline).await?;

            if !response.has_tool_calls() {
                debug!(iteration, "model answered without tool calls");
                return Ok(response.content);
            }

            debug!(iteration, calls = response.tool_calls.len(), "model requested tools");
            messages.push(Message::assistant_with_tools(
                response.content,
                response.tool_calls.clone(),
            ));

            for tool_call in &response.tool_calls {
                let Some(function) = &tool_call.function else {
                    continue;
                };

                let call = match ToolInvocation::parse(
                    &tool_call.id,
                    &function.name,
                    &function.arguments,
                ) {
                    Ok(call) => call,
                    Err(e) => {
                        warn!(tool = %function.name, error = %e, "unparsable tool arguments");
                        messages.push(Message::tool_result(
                            &tool_call.id,
                            &function.name,
                            format!("Error parsing tool arguments: {e}"),
                        ));
                        continue;
                    }
                };

                if let Some(confirm) = &self.confirm {
                    if !self.tools.is_safe_tool(&call.name) && !confirm(&call) {
                        info!(tool = %call.name, "tool execution denied");
                        return Err(AgentError::ToolDenied);
                    }
                }

                let scope = cancel.child_token();
                let _scope_guard = scope.clone().drop_guard();
                let result = self
                    .guarded(self.tools.execute(&call, &scope), cancel, deadline)
                    .await?;
                messages.push(Message::tool_result(
                    &result.tool_call_id,
                    &result.name,
                    result.content_for_model(),
                ));
            }
        }

        warn!(
            max_iterations = self.settings.max_iterations,
            "tool loop hit the iteration cap"
        );
        Err(AgentError::IterationLimitExceeded(
            self.settings.max_iterations,
        ))
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        iteration: usize,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<CompletionResponse, AgentError> {
        let span = tracing::info_span!(
            "gen_ai.complete",
            gen_ai.system = %self.provider.name(),
            gen_ai.request.model = %request.model,
            iteration,
        );
        let response = self
            .guarded(self.provider.complete(request).instrument(span), cancel, deadline)
            .await??;
        Ok(response)
    }

    /// Tool-free turn: stream the answer, forwarding each chunk to the sink.
    async fn stream_answer(
        &self,
        messages: Vec<Message>,
        cancel: &CancellationToken,
        deadline: Instant,
        sink: Option<StreamSink<'_>>,
    ) -> Result<String, AgentError> {
        let mut request = CompletionRequest::new(&self.settings.model, messages);
        request.stream = true;
        let span = tracing::info_span!(
            "gen_ai.stream",
            gen_ai.system = %self.provider.name(),
            gen_ai.request.model = %request.model,
        );

        let collect = async {
            let mut stream = self.provider.stream(request);
            let mut answer = String::new();
            while let Some(event) = stream.next().await {
                if let StreamEvent::TextDelta { text } = event? {
                    if let Some(sink) = sink {
                        sink(&text);
                    }
                    answer.push_str(&text);
                }
            }
            Ok::<_, AgentError>(answer)
        };
        self.guarded(collect.instrument(span), cancel, deadline)
            .await?
    }

    /// Race `fut` against the caller's cancellation and the turn deadline.
    async fn guarded<F: Future>(
        &self,
        fut: F,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<F::Output, AgentError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            _ = tokio::time::sleep_until(deadline) => {
                Err(AgentError::Timeout(self.settings.turn_timeout.as_secs()))
            }
            out = fut => Ok(out),
        }
    }

    /// Load a conversation, creating (and saving) it when missing.
    pub async fn open_conversation(&self, id: &str) -> Result<Conversation, RepositoryError> {
        let id = normalize_id(id);
        match self.conversations.load(id).await {
            Ok(conversation) => Ok(conversation),
            Err(RepositoryError::NotFound) => {
                let conversation = Conversation::new(id);
                self.conversations.save(&conversation).await?;
                info!(conversation_id = id, "conversation created");
                Ok(conversation)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_conversations(&self) -> Result<Vec<String>, RepositoryError> {
        self.conversations.list().await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), RepositoryError> {
        self.conversations.delete(id).await?;
        info!(conversation_id = id, "conversation deleted");
        Ok(())
    }

    pub async fn add_memory(
        &self,
        content: &str,
        memory_type: MemoryType,
    ) -> Result<MemoryItem, RepositoryError> {
        self.memory.add_memory(content, memory_type).await
    }

    pub async fn list_memories(&self) -> Result<Vec<MemoryItem>, RepositoryError> {
        self.memory.list_memories().await
    }

    pub async fn delete_memory(&self, id: &str) -> Result<(), RepositoryError> {
        self.memory.delete_memory(id).await
    }
}

fn normalize_id(id: &str) -> &str {
    let id = id.trim();
    if id.is_empty() {
        DEFAULT_CONVERSATION_ID
    } else {
        id
    }
}

/// Render a call for a confirmation prompt. Shell calls show the command
/// itself; everything else shows the argument JSON.
pub fn format_tool_call(call: &ToolInvocation) -> String {
    if call.name == SHELL_TOOL_NAME {
        if let Some(command) = call.str_arg("command") {
            return format!("shell: {command}");
        }
    }
    if call.arguments.is_empty() {
        return call.name.clone();
    }
    let args = serde_json::to_string(&call.arguments).unwrap_or_else(|_| call.raw_arguments.clone());
    format!("{}({args})", call.name)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};

    use mnemo_types::error::ToolError;
    use mnemo_types::llm::{MessageRole, ToolCall};

    use super::*;
    use crate::memory::MemorySettings;
    use crate::testing::{
        InMemoryConversationRepository, InMemoryMemoryRepository, ScriptedProvider, text_response,
        tool_response,
    };
    use crate::tool::Tool;

    struct UpperTool {
        safe: bool,
        runs: Arc<AtomicUsize>,
    }

    impl Tool for UpperTool {
        fn name(&self) -> &str {
            if self.safe { "upper" } else { "risky_upper" }
        }

        fn description(&self) -> &str {
            "Uppercase the text argument"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        fn is_safe(&self) -> bool {
            self.safe
        }

        async fn execute(
            &self,
            call: &ToolInvocation,
            _cancel: &CancellationToken,
        ) -> Result<String, ToolError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            call.str_arg("text")
                .map(str::to_uppercase)
                .ok_or(ToolError::MissingArgument("text"))
        }
    }

    struct Harness {
        orchestrator: Orchestrator<InMemoryConversationRepository, InMemoryMemoryRepository>,
        conversations: Arc<InMemoryConversationRepository>,
        requests: crate::testing::RequestLog,
        runs: Arc<AtomicUsize>,
    }

    fn harness(provider: ScriptedProvider, with_tools: bool) -> Harness {
        harness_with_threshold(provider, with_tools, 100)
    }

    fn harness_with_threshold(
        provider: ScriptedProvider,
        with_tools: bool,
        summarize_when: usize,
    ) -> Harness {
        let requests = provider.request_log();
        let provider = Arc::new(BoxLlmProvider::new(provider));
        let conversations = Arc::new(InMemoryConversationRepository::default());
        let memories = Arc::new(InMemoryMemoryRepository::default());
        let memory = Arc::new(MemoryManager::new(
            conversations.clone(),
            memories,
            provider.clone(),
            MemorySettings {
                model: "test-model".to_string(),
                max_messages: 50,
                max_tokens: 4000,
                summarize_when,
                background_timeout: Duration::from_secs(5),
            },
        ));

        let runs = Arc::new(AtomicUsize::new(0));
        let mut tools = ToolRegistry::new();
        if with_tools {
            tools.register(UpperTool { safe: true, runs: runs.clone() });
            tools.register(UpperTool { safe: false, runs: runs.clone() });
        }

        let orchestrator = Orchestrator::new(
            provider,
            Arc::new(tools),
            memory,
            conversations.clone(),
            OrchestratorSettings::new("test-model", "You are a test assistant."),
        );
        Harness {
            orchestrator,
            conversations,
            requests,
            runs,
        }
    }

    fn upper_call(id: &str, text: &str) -> ToolCall {
        ToolCall::function(id, "upper", json!({"text": text}).to_string())
    }

    #[tokio::test]
    async fn test_two_tool_calls_then_answer() {
        let provider = ScriptedProvider::with_responses(vec![
            tool_response(vec![upper_call("c1", "first"), upper_call("c2", "second")]),
            text_response("done: FIRST SECOND"),
        ]);
        let h = harness(provider, true);

        let answer = h
            .orchestrator
            .converse("t", "shout please", &CancellationToken::new(), None)
            .await
            .unwrap();
        assert_eq!(answer, "done: FIRST SECOND");

        let requests = h.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), 2);
        let tool_messages: Vec<&Message> = requests[1]
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .collect();
        assert_eq!(tool_messages.len(), 2);
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_messages[0].content, "FIRST");
        assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("c2"));
        assert_eq!(tool_messages[1].content, "SECOND");
    }

    #[tokio::test]
    async fn test_seed_has_system_prompt_with_time_and_ends_with_user() {
        let h = harness(ScriptedProvider::with_texts(["hi"]), true);
        h.orchestrator
            .converse("t", "hello", &CancellationToken::new(), None)
            .await
            .unwrap();

        let requests = h.requests.lock().unwrap();
        let messages = &requests[0].messages;
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.starts_with("You are a test assistant.\n\nCurrent date and time: "));
        assert_eq!(messages.last(), Some(&Message::user("hello")));
    }

    #[tokio::test]
    async fn test_always_tool_calls_hits_iteration_cap() {
        let provider = ScriptedProvider::always(tool_response(vec![upper_call("c", "x")]));
        let h = harness(provider, true);

        let err = h
            .orchestrator
            .converse("t", "loop", &CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::IterationLimitExceeded(10)));
        assert_eq!(h.requests.lock().unwrap().len(), 10);
        assert_eq!(h.conversations.write_count(), 0);
        assert!(h.conversations.load("t").await.is_err());
    }

    #[tokio::test]
    async fn test_denial_leaves_conversation_unchanged() {
        let provider = ScriptedProvider::with_responses(vec![
            tool_response(vec![ToolCall::function(
                "c1",
                "risky_upper",
                r#"{"text":"x"}"#,
            )]),
            text_response("never reached"),
        ]);
        let h = harness(provider, true);
        let mut existing = Conversation::new("t");
        existing.messages.push(Message::user("earlier"));
        existing.messages.push(Message::assistant("reply"));
        h.conversations.save(&existing).await.unwrap();
        let before = serde_json::to_string(&h.conversations.load("t").await.unwrap()).unwrap();

        let orchestrator = h.orchestrator.with_confirmation(Arc::new(|_: &ToolInvocation| false));
        let err = orchestrator
            .converse("t", "do it", &CancellationToken::new(), None)
            .await
            .unwrap_err();

        assert!(err.is_denied());
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
        let after = serde_json::to_string(&h.conversations.load("t").await.unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_safe_tools_skip_confirmation() {
        let provider = ScriptedProvider::with_responses(vec![
            tool_response(vec![upper_call("c1", "ok")]),
            text_response("fine"),
        ]);
        let h = harness(provider, true);
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let orchestrator = h.orchestrator.with_confirmation(Arc::new(move |_: &ToolInvocation| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        }));

        let answer = orchestrator
            .converse("t", "go", &CancellationToken::new(), None)
            .await
            .unwrap();
        assert_eq!(answer, "fine");
        assert_eq!(asked.load(Ordering::SeqCst), 0);
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparsable_arguments_are_fed_back() {
        let provider = ScriptedProvider::with_responses(vec![
            tool_response(vec![ToolCall::function("bad", "upper", "{not json")]),
            text_response("recovered"),
        ]);
        let h = harness(provider, true);

        let answer = h
            .orchestrator
            .converse("t", "try", &CancellationToken::new(), None)
            .await
            .unwrap();
        assert_eq!(answer, "recovered");
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);

        let requests = h.requests.lock().unwrap();
        let tool_message = requests[1]
            .messages
            .iter()
            .find(|m| m.role == MessageRole::Tool)
            .unwrap();
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("bad"));
        assert!(tool_message.content.contains("parsing"));
    }

    #[tokio::test]
    async fn test_call_without_function_is_skipped_and_errors_are_fed_back() {
        let provider = ScriptedProvider::with_responses(vec![
            tool_response(vec![
                ToolCall {
                    id: "empty".to_string(),
                    kind: "function".to_string(),
                    function: None,
                },
                ToolCall::function("c2", "upper", "{}"),
                ToolCall::function("c3", "missing_tool", "{}"),
            ]),
            text_response("ok"),
        ]);
        let h = harness(provider, true);
        h.orchestrator
            .converse("t", "go", &CancellationToken::new(), None)
            .await
            .unwrap();

        let requests = h.requests.lock().unwrap();
        let contents: Vec<&str> = requests[1]
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["Error: text is required", "Error: unknown tool: missing_tool"]);
    }

    #[tokio::test]
    async fn test_success_persists_only_user_and_answer() {
        let provider = ScriptedProvider::with_responses(vec![
            tool_response(vec![upper_call("c1", "a")]),
            text_response("final"),
        ]);
        let h = harness(provider, true);
        h.orchestrator
            .converse("t", "question", &CancellationToken::new(), None)
            .await
            .unwrap();

        assert_eq!(h.conversations.write_count(), 1);
        let stored = h.conversations.load("t").await.unwrap();
        assert_eq!(
            stored.messages,
            vec![Message::user("question"), Message::assistant("final")]
        );
    }

    #[tokio::test]
    async fn test_provider_error_aborts_without_saving() {
        let h = harness(ScriptedProvider::failing(), true);
        let err = h
            .orchestrator
            .converse("t", "hi", &CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
        assert_eq!(h.conversations.write_count(), 0);
    }

    #[tokio::test]
    async fn test_streaming_mode_without_tools() {
        let h = harness(ScriptedProvider::with_texts(["hello there friend"]), false);
        let chunks = Arc::new(Mutex::new(Vec::<String>::new()));
        let collected = chunks.clone();
        let sink = move |text: &str| collected.lock().unwrap().push(text.to_string());
        let sink: StreamSink<'_> = &sink;

        let answer = h
            .orchestrator
            .converse("s", "hi", &CancellationToken::new(), Some(sink))
            .await
            .unwrap();

        assert_eq!(answer, "hello there friend");
        assert_eq!(*chunks.lock().unwrap(), vec!["hello ", "there ", "friend"]);
        assert!(h.requests.lock().unwrap()[0].stream);
        assert_eq!(h.conversations.load("s").await.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_sink_receives_whole_answer_in_tool_mode() {
        let h = harness(ScriptedProvider::with_texts(["whole answer"]), true);
        let chunks = Arc::new(Mutex::new(Vec::<String>::new()));
        let collected = chunks.clone();
        let sink = move |text: &str| collected.lock().unwrap().push(text.to_string());
        let sink: StreamSink<'_> = &sink;

        h.orchestrator
            .converse("t", "hi", &CancellationToken::new(), Some(sink))
            .await
            .unwrap();
        assert_eq!(*chunks.lock().unwrap(), vec!["whole answer"]);
    }

    #[tokio::test]
    async fn test_cancellation_during_provider_call() {
        let provider =
            ScriptedProvider::with_texts(["slow"]).with_delay(Duration::from_secs(10));
        let h = harness(provider, true);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = h
            .orchestrator
            .converse("t", "hi", &cancel, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
        assert_eq!(h.conversations.write_count(), 0);
    }

    #[tokio::test]
    async fn test_open_conversation_defaults_and_creates() {
        let h = harness(ScriptedProvider::with_texts(Vec::<String>::new()), false);
        let conv = h.orchestrator.open_conversation("  ").await.unwrap();
        assert_eq!(conv.id, "default");
        assert_eq!(h.orchestrator.list_conversations().await.unwrap(), vec!["default"]);

        h.orchestrator.delete_conversation("default").await.unwrap();
        assert!(h.orchestrator.list_conversations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_passthrough() {
        let h = harness(ScriptedProvider::with_texts(Vec::<String>::new()), false);
        let item = h.orchestrator.add_memory("X", MemoryType::Fact).await.unwrap();
        let items = h.orchestrator.list_memories().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].relevance, 1.0);

        h.orchestrator.delete_memory(&item.id).await.unwrap();
        assert!(h.orchestrator.list_memories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_turn_at_threshold_summarizes_once() {
        // Every call gets the same reply, so the answer, summary, and
        // extraction calls may interleave in any order.
        let provider = ScriptedProvider::always(text_response("fact: The user counts to five"));
        let h = harness_with_threshold(provider, true, 5);

        let mut existing = Conversation::new("t");
        for i in 0..5 {
            existing.messages.push(if i % 2 == 0 {
                Message::user(format!("number {i}"))
            } else {
                Message::assistant(format!("ok {i}"))
            });
        }
        h.conversations.save(&existing).await.unwrap();

        h.orchestrator
            .converse("t", "and six", &CancellationToken::new(), None)
            .await
            .unwrap();
        h.orchestrator.memory().drain_background().await;

        let summarize_calls = h
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.messages
                    .first()
                    .is_some_and(|m| m.content.starts_with("Summarize the following conversation"))
            })
            .count();
        assert_eq!(summarize_calls, 1);

        let stored = h.conversations.load("t").await.unwrap();
        assert!(stored.messages.len() <= 10);
        assert_eq!(stored.summary, "fact: The user counts to five");
        assert_eq!(stored.messages.last(), Some(&Message::assistant("fact: The user counts to five")));
        assert!(!h.orchestrator.memory().is_summarizing("t"));
    }

    #[test]
    fn test_format_tool_call() {
        let shell = ToolInvocation::parse("c", "shell", r#"{"command":"ls -la"}"#).unwrap();
        assert_eq!(format_tool_call(&shell), "shell: ls -la");

        let pwd = ToolInvocation::parse("c", "pwd", "").unwrap();
        assert_eq!(format_tool_call(&pwd), "pwd");

        let cat = ToolInvocation::parse("c", "cat", r#"{"path":"a.txt"}"#).unwrap();
        assert_eq!(format_tool_call(&cat), r#"cat({"path":"a.txt"})"#);
    }
}
