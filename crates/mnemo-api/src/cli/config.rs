//! Configuration CLI commands: init and show.

use std::io::IsTerminal;

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input, Password};

use mnemo_infra::config::{API_KEY_ENV_VARS, save_config};
use mnemo_types::config::AppConfig;
use mnemo_types::llm::ProviderType;

use crate::state::LoadedConfig;

/// Interactively write a new config file.
///
/// The API key is taken from the environment when one is set; otherwise it
/// is prompted for without echo.
pub async fn init_config(loaded: &LoadedConfig) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        bail!("`mnemo config init` needs an interactive terminal");
    }

    let path = &loaded.path;
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("  {}", style("Cancelled.").dim());
            return Ok(());
        }
    }

    let mut config = AppConfig::default();

    let env_key = API_KEY_ENV_VARS
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()));
    config.provider.api_key = match env_key {
        Some(key) => {
            println!("  {} Using API key from environment.", style("i").blue().bold());
            key
        }
        None => Password::new()
            .with_prompt("Enter API key")
            .allow_empty_password(true)
            .interact()?,
    };

    let provider: String = Input::new()
        .with_prompt("Provider (openai/zhipu/glm)")
        .default("openai".to_string())
        .interact_text()?;
    config.provider.provider_type = provider
        .parse::<ProviderType>()
        .map_err(anyhow::Error::msg)?;

    let model: String = Input::new()
        .with_prompt("Model")
        .default(config.provider.provider_type.default_model().to_string())
        .interact_text()?;
    apply_provider_choice(&mut config, model.trim());

    save_config(path, &config)
        .await
        .with_context(|| format!("saving config to {}", path.display()))?;

    println!();
    println!(
        "  {} Configuration saved to: {}",
        style("✓").green().bold(),
        style(path.display()).cyan()
    );
    println!();
    Ok(())
}

/// Record the chosen model, leaving base URL and model unset when they match
/// the provider defaults so later default changes still apply.
fn apply_provider_choice(config: &mut AppConfig, model: &str) {
    let provider_type = config.provider.provider_type;
    config.provider.model = if model.is_empty() || model == provider_type.default_model() {
        None
    } else {
        Some(model.to_string())
    };
    config.provider.base_url = None;
}

/// Print the effective configuration. The API key is never shown.
pub fn show_config(loaded: &LoadedConfig, json: bool) -> Result<()> {
    let config = &loaded.config;
    let work_dir = loaded.work_dir();
    let has_key = !config.provider.api_key.trim().is_empty();

    if json {
        let out = serde_json::json!({
            "config_file": loaded.path,
            "provider": config.provider.provider_type.to_string(),
            "base_url": config.provider.base_url(),
            "model": config.provider.model(),
            "api_key_set": has_key,
            "work_dir": work_dir,
            "max_messages": config.context.max_messages,
            "max_tokens": config.context.max_tokens,
            "summarize_when": config.context.summarize_when,
            "agent_name": config.agent.name,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let rows = [
        ("Config File", loaded.path.display().to_string()),
        ("Provider", config.provider.provider_type.to_string()),
        ("Base URL", config.provider.base_url().to_string()),
        ("Model", config.provider.model().to_string()),
        ("API Key", if has_key { "set".to_string() } else { "not set".to_string() }),
        ("Work Dir", work_dir.display().to_string()),
        ("Max Messages", config.context.max_messages.to_string()),
        ("Max Tokens", config.context.max_tokens.to_string()),
        ("Summarize When", config.context.summarize_when.to_string()),
    ];

    println!();
    for (label, value) in rows {
        println!("  {} {}", style(format!("{label}:")).bold(), value);
    }
    println!();

    if !has_key {
        print_missing_key_hint();
    }
    Ok(())
}

fn print_missing_key_hint() {
    println!(
        "  {} No API key configured. Run `mnemo config init` or set MNEMO_API_KEY.",
        style("!").yellow().bold()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zhipu_choice_keeps_defaults_implicit() {
        let mut config = AppConfig::default();
        config.provider.provider_type = ProviderType::Zhipu;
        apply_provider_choice(&mut config, "glm-4-flash");
        assert_eq!(config.provider.model, None);
        assert_eq!(config.provider.model(), "glm-4-flash");
        assert_eq!(config.provider.base_url(), "https://open.bigmodel.cn/api/paas/v4");
    }

    #[test]
    fn test_custom_model_is_recorded() {
        let mut config = AppConfig::default();
        apply_provider_choice(&mut config, "gpt-4o");
        assert_eq!(config.provider.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.provider.base_url(), "https://api.openai.com/v1");
    }
}
