//! Configuration and per-provider defaults for OpenAI-compatible providers.
//!
//! OpenAI and Zhipu (GLM) both speak the chat-completions protocol; they
//! differ only in endpoint and default model.

use std::time::Duration;

use secrecy::SecretString;

use mnemo_types::config::ProviderSettings;
use mnemo_types::llm::{ProviderCapabilities, ProviderType};

/// HTTP timeout for a single completion request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "zhipu").
    pub provider_name: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: SecretString,
    /// Used when a request leaves its model empty.
    pub model: String,
    pub timeout: Duration,
    pub capabilities: ProviderCapabilities,
}

impl OpenAiCompatConfig {
    /// Build from the `[provider]` config section, applying the provider
    /// type's default endpoint and model where unset.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut config = match settings.provider_type {
            ProviderType::OpenAi => openai_defaults(&settings.api_key, settings.model()),
            ProviderType::Zhipu => zhipu_defaults(&settings.api_key, settings.model()),
        };
        config.base_url = settings.base_url().trim_end_matches('/').to_string();
        config
    }
}

/// OpenAI: `https://api.openai.com/v1`, 128K context.
pub fn openai_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: ProviderType::OpenAi.default_base_url().into(),
        api_key: SecretString::from(api_key.to_string()),
        model: model.into(),
        timeout: REQUEST_TIMEOUT,
        capabilities: ProviderCapabilities {
            streaming: true,
            tool_calling: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Zhipu GLM: `https://open.bigmodel.cn/api/paas/v4`, 128K context.
pub fn zhipu_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "zhipu".into(),
        base_url: ProviderType::Zhipu.default_base_url().into(),
        api_key: SecretString::from(api_key.to_string()),
        model: model.into(),
        timeout: REQUEST_TIMEOUT,
        capabilities: ProviderCapabilities {
            streaming: true,
            tool_calling: true,
            max_context_tokens: 128_000,
            max_output_tokens: 4_096,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_from_settings_uses_type_defaults() {
        let settings = ProviderSettings {
            provider_type: ProviderType::Zhipu,
            api_key: "key".to_string(),
            ..ProviderSettings::default()
        };
        let config = OpenAiCompatConfig::from_settings(&settings);
        assert_eq!(config.provider_name, "zhipu");
        assert_eq!(config.base_url, "https://open.bigmodel.cn/api/paas/v4");
        assert_eq!(config.model, "glm-4-flash");
        assert_eq!(config.api_key.expose_secret(), "key");
    }

    #[test]
    fn test_from_settings_trims_trailing_slash() {
        let settings = ProviderSettings {
            base_url: Some("http://localhost:8080/v1/".to_string()),
            model: Some("local-model".to_string()),
            ..ProviderSettings::default()
        };
        let config = OpenAiCompatConfig::from_settings(&settings);
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.timeout, REQUEST_TIMEOUT);
    }
}
