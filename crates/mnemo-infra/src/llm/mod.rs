//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](mnemo_core::llm::provider::LlmProvider)
//! implementation for OpenAI-compatible APIs and a factory
//! ([`create_provider`]) that constructs it from the `[provider]` config
//! section. Providers are built once at startup and injected; there is no
//! global registry.

pub mod openai_compat;

use mnemo_core::llm::box_provider::BoxLlmProvider;
use mnemo_types::config::ProviderSettings;
use mnemo_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from provider settings.
///
/// # Errors
///
/// `AuthenticationFailed` when no API key is configured.
pub fn create_provider(settings: &ProviderSettings) -> Result<BoxLlmProvider, LlmError> {
    if settings.api_key.trim().is_empty() {
        return Err(LlmError::AuthenticationFailed);
    }
    let config = OpenAiCompatConfig::from_settings(settings);
    tracing::debug!(
        provider = %config.provider_name,
        base_url = %config.base_url,
        model = %config.model,
        "creating LLM provider"
    );
    let provider = OpenAiCompatibleProvider::new(config)?;
    Ok(BoxLlmProvider::new(provider))
}
