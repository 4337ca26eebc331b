//! mnemo CLI entry point.
//!
//! Binary name: `mnemo`
//!
//! Parses CLI arguments, loads configuration, initializes tracing, then
//! dispatches to a subcommand, a single-shot prompt, or the chat loop.

mod cli;
mod state;

use std::io::IsTerminal;

use clap::Parser;
use clap_complete::generate;

use mnemo_observe::{LogOptions, init_tracing, shutdown_tracing};
use mnemo_types::config::LogFormat;

use cli::confirm::{Activity, ApprovalMode, confirmation_hook};
use cli::{Cli, Commands, ConfigCommand, MemoryCommand, SkillCommand};
use state::{AppState, LoadedConfig, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions need neither config nor logging.
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mnemo", &mut std::io::stdout());
        return Ok(());
    }

    let loaded = LoadedConfig::load(cli.config.as_deref()).await?;

    let log_options = LogOptions {
        level: cli
            .log_level_override()
            .map(str::to_string)
            .unwrap_or_else(|| loaded.config.logging.level.clone()),
        json: loaded.config.logging.format == LogFormat::Json,
        enable_otel: std::env::var("MNEMO_OTEL").is_ok_and(|v| v == "1" || v == "true"),
    };
    if let Err(e) = init_tracing(&log_options) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
    tracing::debug!(config = %loaded.path.display(), "configuration loaded");

    let result = run(cli, loaded).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, loaded: LoadedConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Config { action }) => match action {
            ConfigCommand::Init => cli::config::init_config(&loaded).await,
            ConfigCommand::Show => cli::config::show_config(&loaded, cli.json),
        },

        Some(Commands::List) => {
            let stores = Stores::open(&loaded).await?;
            cli::conversation::list_conversations(&stores, None, cli.json).await
        }

        Some(Commands::Delete { id }) => {
            let stores = Stores::open(&loaded).await?;
            cli::conversation::delete_conversation(&stores, &id, cli.json).await
        }

        Some(Commands::Memory { action }) => {
            let stores = Stores::open(&loaded).await?;
            match action {
                MemoryCommand::List => cli::memory::list_memories(&stores, cli.json).await,
                MemoryCommand::Add {
                    memory_type,
                    content,
                } => {
                    cli::memory::add_memory(&stores, &memory_type, &content.join(" "), cli.json)
                        .await
                }
                MemoryCommand::Delete { id } => {
                    cli::memory::delete_memory(&stores, &id, cli.json).await
                }
            }
        }

        Some(Commands::Skill { action }) => {
            let stores = Stores::open(&loaded).await?;
            match action {
                SkillCommand::List => cli::skill::print_skills(&stores.skills.list(), cli.json),
            }
        }

        Some(Commands::Tools) => {
            let stores = Stores::open(&loaded).await?;
            cli::tools::print_tools(&stores.tool_registry(), cli.json)
        }

        Some(Commands::Completions { .. }) => Ok(()),

        None => {
            let activity = Activity::default();
            let mode = if cli.yes {
                ApprovalMode::AutoApprove
            } else {
                ApprovalMode::Ask
            };
            let hook = confirmation_hook(mode, activity.clone());
            let state = AppState::init(&loaded, Some(hook)).await?;
            let stream = !cli.no_stream;

            let outcome = match cli.prompt_text() {
                Some(prompt) => {
                    cli::ask::run_prompt(
                        &state,
                        &activity,
                        &cli.conversation,
                        &prompt,
                        stream,
                        cli.json,
                    )
                    .await
                }
                None if std::io::stdin().is_terminal() => {
                    cli::chat::loop_runner::run_chat_loop(
                        &state,
                        &activity,
                        &cli.conversation,
                        stream,
                    )
                    .await
                }
                None => Err(anyhow::anyhow!(
                    "no prompt given and stdin is not a terminal; pass a prompt or run interactively"
                )),
            };

            // Let a triggered summarization finish before the process exits.
            state.shutdown().await;
            outcome
        }
    }
}
