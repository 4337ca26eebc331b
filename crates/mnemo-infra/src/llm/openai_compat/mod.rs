//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI and Zhipu GLM via
//! configurable base URLs. Requests go to `{base_url}/chat/completions` with
//! bearer authentication; streaming uses server-sent events.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

pub mod config;
pub mod streaming;
pub mod types;

use std::pin::Pin;

use futures_util::Stream;
use reqwest_eventsource::EventSource;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use mnemo_core::llm::provider::LlmProvider;
use mnemo_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};

use self::config::OpenAiCompatConfig;
use self::streaming::map_event_source;
use self::types::{ChatRequest, ChatResponse, ErrorEnvelope};

/// Unified provider for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug; the key lives in a [`SecretString`] and never
/// reaches logs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    provider_name: String,
    base_url: String,
    api_key: SecretString,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            provider_name: config.provider_name,
            base_url: config.base_url,
            api_key: config.api_key,
            model: config.model,
            capabilities: config.capabilities,
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn resolve_model<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        if request.model.is_empty() {
            &self.model
        } else {
            &request.model
        }
    }

    fn chat_request<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: self.resolve_model(request),
            messages: &request.messages,
            tools: &request.tools,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        }
    }

    fn post(&self) -> reqwest::RequestBuilder {
        self.client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json")
    }
}

// OpenAiCompatibleProvider intentionally does NOT derive Debug.

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.chat_request(request, false);
        debug!(
            message_count = body.messages.len(),
            tool_count = body.tools.len(),
            model = body.model,
            "sending completion request"
        );
        let started = std::time::Instant::now();

        let response = self
            .post()
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::Provider {
            message: format!("reading response: {e}"),
        })?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "completion request rejected");
            return Err(error_for_status(status.as_u16(), &text));
        }

        let completion = parse_completion(&text)?;
        info!(
            prompt_tokens = completion.usage.input_tokens,
            completion_tokens = completion.usage.output_tokens,
            tool_calls = completion.tool_calls.len(),
            stop_reason = %completion.stop_reason,
            duration_ms = started.elapsed().as_millis() as u64,
            "completion received"
        );
        Ok(completion)
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.chat_request(&request, true);
        debug!(message_count = body.messages.len(), "starting stream request");
        match EventSource::new(self.post().json(&body)) {
            Ok(source) => map_event_source(source),
            Err(e) => Box::pin(futures_util::stream::once(async move {
                Err(LlmError::Stream(format!("cannot open event stream: {e}")))
            })),
        }
    }
}

/// Map a non-success HTTP status (and its body) to an [`LlmError`].
pub(crate) fn error_for_status(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        503 | 529 => LlmError::Overloaded(message),
        400 | 404 | 422 => LlmError::InvalidRequest(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

/// Decode a full (non-streaming) chat-completions body.
pub(crate) fn parse_completion(body: &str) -> Result<CompletionResponse, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

    if let Some(error) = response.error {
        return Err(LlmError::Provider {
            message: format!("API error: {}", error.message),
        });
    }

    let Some(choice) = response.choices.into_iter().next() else {
        return Err(LlmError::Provider {
            message: "no choices in response".to_string(),
        });
    };

    let message = choice.message.or(choice.delta);
    let (content, tool_calls) = match message {
        Some(m) => (m.content.unwrap_or_default(), m.tool_calls.unwrap_or_default()),
        None => (String::new(), Vec::new()),
    };

    let stop_reason = if tool_calls.is_empty() {
        StopReason::from_finish_reason(choice.finish_reason.as_deref())
    } else {
        StopReason::ToolUse
    };
    let usage = response
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: response.id,
        content,
        tool_calls,
        model: response.model,
        stop_reason,
        usage,
    })
}
