//! Conversation CLI commands: list and delete.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use mnemo_core::repository::conversation::ConversationRepository;
use mnemo_infra::json::JsonConversationRepository;
use mnemo_types::conversation::Conversation;
use mnemo_types::error::RepositoryError;

use crate::state::Stores;

/// List conversations with message counts.
///
/// `current` is marked with `*` (used by the chat loop).
///
/// # Examples
///
/// ```bash
/// mnemo list
/// mnemo list --json
/// ```
pub async fn list_conversations(stores: &Stores, current: Option<&str>, json: bool) -> Result<()> {
    let conversations = load_all(&stores.conversations).await?;

    if json {
        let rows: Vec<_> = conversations
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "messages": c.messages.len(),
                    "has_summary": c.has_summary(),
                    "updated_at": c.updated_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!();
        println!("  {} No conversations found.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Conversation").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for conversation in &conversations {
        let marker = if current == Some(conversation.id.as_str()) { "*" } else { "" };
        table.add_row(vec![
            Cell::new(marker).fg(Color::Green),
            Cell::new(&conversation.id).fg(Color::Cyan),
            Cell::new(conversation.messages.len()).fg(Color::White),
            Cell::new(if conversation.has_summary() { "yes" } else { "-" }).fg(Color::DarkGrey),
            Cell::new(conversation.updated_at.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}",
        style(conversations.len()).bold(),
        if conversations.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Delete a conversation by id.
pub async fn delete_conversation(stores: &Stores, id: &str, json: bool) -> Result<()> {
    match stores.conversations.delete(id).await {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => bail!("Conversation '{id}' not found"),
        Err(e) => return Err(e).with_context(|| format!("deleting conversation '{id}'")),
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("  {} Deleted: {}", style("✓").green().bold(), style(id).cyan());
    }
    Ok(())
}

/// Every readable conversation, in id order. Unreadable records are skipped.
async fn load_all(repo: &JsonConversationRepository) -> Result<Vec<Conversation>> {
    let ids = repo.list().await.context("listing conversations")?;
    let mut conversations = Vec::with_capacity(ids.len());
    for id in ids {
        match repo.load(&id).await {
            Ok(conversation) => conversations.push(conversation),
            Err(e) => tracing::warn!(conversation_id = %id, error = %e, "skipping unreadable conversation"),
        }
    }
    Ok(conversations)
}
