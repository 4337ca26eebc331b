//! Main chat loop orchestration.
//!
//! Opens the conversation, prints the banner, then alternates between
//! reading input and either running a slash command or a conversation turn.

use std::ops::ControlFlow;

use anyhow::Context;
use console::style;
use tracing::info;

use mnemo_types::error::RepositoryError;
use mnemo_types::memory::MemoryType;

use crate::cli::ask::run_turn;
use crate::cli::confirm::Activity;
use crate::cli::{conversation, memory, skill, tools};
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// Run the interactive chat loop on `conversation_id`.
pub async fn run_chat_loop(
    state: &AppState,
    activity: &Activity,
    conversation_id: &str,
    stream: bool,
) -> anyhow::Result<()> {
    let mut current = state
        .orchestrator
        .open_conversation(conversation_id)
        .await
        .with_context(|| format!("opening conversation '{conversation_id}'"))?
        .id;

    print_welcome_banner(
        &state.config.agent.name,
        &state.orchestrator.settings().model,
        &current,
    );

    let (mut chat_input, _writer) = ChatInput::new("> ".to_string())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    info!(conversation_id = %current, "chat session started");

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof | InputEvent::Interrupted => break,
            InputEvent::Message(text) => text,
        };
        if text.is_empty() {
            continue;
        }

        if let Some(command) = commands::parse(&text) {
            match handle_command(state, &mut current, &mut chat_input, command).await {
                ControlFlow::Continue(()) => continue,
                ControlFlow::Break(()) => break,
            }
        }

        println!();
        match run_turn(state, activity, &current, &text, stream).await {
            Ok(output) => {
                if !output.streamed {
                    print!("{}", output.reply);
                }
                println!();
                println!();
            }
            // Denial already showed the prompt; go straight back to input.
            Err(e) if e.is_denied() => println!(),
            Err(e) => {
                println!();
                eprintln!("  {} {e}", style("Error:").red().bold());
                println!();
            }
        }
    }

    println!("\n  {}", style("Goodbye!").dim());
    info!(conversation_id = %current, "chat session ended");
    Ok(())
}

/// Execute one slash command. `Break` ends the loop.
async fn handle_command(
    state: &AppState,
    current: &mut String,
    chat_input: &mut ChatInput,
    command: ChatCommand,
) -> ControlFlow<()> {
    let result: anyhow::Result<()> = match command {
        ChatCommand::Help => {
            commands::print_help();
            Ok(())
        }
        ChatCommand::New(name) => {
            let name = name.unwrap_or_else(|| "default".to_string());
            switch_to(state, current, &name, "Started new conversation").await
        }
        ChatCommand::List => {
            conversation::list_conversations(&state.stores, Some(current.as_str()), false).await
        }
        ChatCommand::Switch(id) => switch_to(state, current, &id, "Switched to").await,
        ChatCommand::Delete(id) => delete(state, current, &id).await,
        ChatCommand::Memories => match state.orchestrator.list_memories().await {
            Ok(items) => memory::print_memories(&items, false),
            Err(e) => Err(e.into()),
        },
        ChatCommand::Remember {
            memory_type,
            content,
        } => state
            .orchestrator
            .add_memory(&content, MemoryType::parse_lenient(&memory_type))
            .await
            .map(|item| memory::print_added(&item))
            .map_err(Into::into),
        ChatCommand::Skills => skill::print_skills(&state.stores.skills.list(), false),
        ChatCommand::Tools => tools::print_tools(state.orchestrator.tools(), false),
        ChatCommand::Clear => {
            chat_input.clear();
            Ok(())
        }
        ChatCommand::Exit => return ControlFlow::Break(()),
        ChatCommand::Usage(usage) => {
            println!("  Usage: {usage}");
            Ok(())
        }
        ChatCommand::Unknown(name) => {
            println!(
                "  {} Unknown command: {}. Type /help for available commands.",
                style("?").yellow().bold(),
                style(name).dim()
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("  {} {e:#}", style("Error:").red().bold());
    }
    ControlFlow::Continue(())
}

async fn switch_to(
    state: &AppState,
    current: &mut String,
    id: &str,
    verb: &str,
) -> anyhow::Result<()> {
    let conversation = state.orchestrator.open_conversation(id).await?;
    *current = conversation.id;
    info!(conversation_id = %current, "conversation switched");
    println!("  {verb}: {}", style(current.as_str()).cyan());
    Ok(())
}

async fn delete(state: &AppState, current: &mut String, id: &str) -> anyhow::Result<()> {
    match state.orchestrator.delete_conversation(id).await {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => anyhow::bail!("conversation '{id}' not found"),
        Err(e) => return Err(e.into()),
    }
    println!("  Deleted: {}", style(id).cyan());

    // Keep a valid conversation selected.
    if current.as_str() == id {
        switch_to(state, current, "default", "Switched to").await?;
    }
    Ok(())
}
