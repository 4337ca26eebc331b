//! Configuration types for mnemo.
//!
//! `AppConfig` mirrors `config.toml`. Every section is `#[serde(default)]`
//! so partial files only override what they mention.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub storage: StorageSettings,
    pub context: ContextSettings,
    pub agent: AgentSettings,
    pub logging: LoggingSettings,
}

/// LLM provider connection settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    /// Falls back to the provider type's default endpoint when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Falls back to the provider type's default model when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::OpenAi,
            base_url: None,
            api_key: String::new(),
            model: None,
        }
    }
}

impl ProviderSettings {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider_type.default_base_url())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider_type.default_model())
    }
}

// Hand-written so the API key never reaches logs.
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("provider_type", &self.provider_type)
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .finish()
    }
}

/// Where conversations, memories, and skills live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Unset means the data directory holding `config.toml`. Relative
    /// paths are resolved against that directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolve_work_dir(&self, data_dir: &Path) -> PathBuf {
        match &self.work_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => data_dir.join(dir),
            None => data_dir.to_path_buf(),
        }
    }
}

/// Context window and summarization thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Upper bound on history messages in the sliding window.
    pub max_messages: usize,
    /// Approximate token budget for one turn's context.
    pub max_tokens: usize,
    /// Stored message count at which background summarization starts.
    pub summarize_when: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_messages: 50,
            max_tokens: 4000,
            summarize_when: 30,
        }
    }
}

/// Agent identity and loop limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub name: String,
    pub system_prompt: String,
    pub max_iterations: usize,
    pub turn_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: "mnemo".to_string(),
            system_prompt: "You are a helpful AI assistant. Be concise and accurate.".to_string(),
            max_iterations: 10,
            turn_timeout_secs: 300,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.provider.provider_type, ProviderType::OpenAi);
        assert_eq!(config.provider.base_url(), "https://api.openai.com/v1");
        assert_eq!(config.provider.model(), "gpt-4o-mini");
        assert_eq!(config.context.max_messages, 50);
        assert_eq!(config.context.max_tokens, 4000);
        assert_eq!(config.context.summarize_when, 30);
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.storage.work_dir.is_none());
    }

    #[test]
    fn test_resolve_work_dir() {
        let data_dir = Path::new("/home/u/.mnemo");
        let mut storage = StorageSettings::default();
        assert_eq!(storage.resolve_work_dir(data_dir), data_dir);

        storage.work_dir = Some(PathBuf::from("store"));
        assert_eq!(storage.resolve_work_dir(data_dir), data_dir.join("store"));

        storage.work_dir = Some(PathBuf::from("/var/lib/mnemo"));
        assert_eq!(storage.resolve_work_dir(data_dir), Path::new("/var/lib/mnemo"));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[provider]
type = "glm"
model = "glm-4-plus"

[context]
summarize_when = 12
"#,
        )
        .unwrap();
        assert_eq!(config.provider.provider_type, ProviderType::Zhipu);
        assert_eq!(config.provider.model(), "glm-4-plus");
        assert_eq!(config.provider.base_url(), "https://open.bigmodel.cn/api/paas/v4");
        assert_eq!(config.context.summarize_when, 12);
        assert_eq!(config.context.max_tokens, 4000);
        assert_eq!(config.agent.name, "mnemo");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = ProviderSettings {
            api_key: "sk-secret".to_string(),
            ..ProviderSettings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
