//! Configuration loader for mnemo.
//!
//! Reads `config.toml` from the data directory (`~/.mnemo/` by default) and
//! deserializes it into [`AppConfig`]. A missing or malformed default file
//! falls back to defaults; an explicitly requested file must exist and
//! parse.

use std::path::{Path, PathBuf};

use thiserror::Error;

use mnemo_types::config::AppConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MNEMO_DATA_DIR";

/// Environment variables consulted, in order, when the file has no API key.
pub const API_KEY_ENV_VARS: [&str; 3] = ["MNEMO_PROVIDER_API_KEY", "MNEMO_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `MNEMO_DATA_DIR` environment variable
/// 2. `~/.mnemo`
/// 3. `.mnemo` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".mnemo");
    }

    PathBuf::from(".mnemo")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Load `{data_dir}/config.toml`, falling back to defaults.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or malformed file: logs a warning and returns the default.
///
/// Environment overrides are applied in both cases.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let path = config_path(data_dir);

    let mut config = match tokio::fs::read_to_string(&path).await {
        Ok(content) => match toml::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
                AppConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Load an explicitly requested config file. Errors when it is missing or
/// malformed.
pub async fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let mut config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Fill in the API key from the environment when the file has none.
///
/// `lookup` abstracts `std::env::var` so the precedence can be tested.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if !config.provider.api_key.trim().is_empty() {
        return;
    }
    for key in API_KEY_ENV_VARS {
        if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(source = key, "API key taken from environment");
            config.provider.api_key = value;
            return;
        }
    }
}

/// Write `config` as pretty TOML to `path`, creating parent directories.
pub async fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), "configuration saved");
    Ok(())
}
