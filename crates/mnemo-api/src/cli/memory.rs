//! Memory CLI commands: list, add, delete.
//!
//! These work directly on the memory store, so they need no API key.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use mnemo_core::repository::memory::MemoryRepository;
use mnemo_types::error::RepositoryError;
use mnemo_types::memory::{MANUAL_RELEVANCE, MemoryItem, MemoryType};

use crate::state::Stores;

/// List all memories.
///
/// # Examples
///
/// ```bash
/// mnemo memory list
/// mnemo memory list --json
/// ```
pub async fn list_memories(stores: &Stores, json: bool) -> Result<()> {
    let memories = stores.memories.list().await.context("listing memories")?;
    print_memories(&memories, json)
}

/// Render memories as a table (or JSON).
pub fn print_memories(memories: &[MemoryItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(memories)?);
        return Ok(());
    }

    if memories.is_empty() {
        println!();
        println!(
            "  {} No memories stored. Add one with: mnemo memory add <type> <content>",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Content").fg(Color::White),
        Cell::new("Relevance").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for memory in memories {
        let type_cell = match memory.memory_type {
            MemoryType::Fact => Cell::new("fact").fg(Color::Cyan),
            MemoryType::Preference => Cell::new("preference").fg(Color::Magenta),
            MemoryType::Context => Cell::new("context").fg(Color::Blue),
        };
        table.add_row(vec![
            Cell::new(&memory.id).fg(Color::DarkGrey),
            type_cell,
            Cell::new(truncate(&memory.content, 60)).fg(Color::White),
            Cell::new(format!("{:.2}", memory.relevance)).fg(Color::Yellow),
            Cell::new(memory.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} memor{}",
        style(memories.len()).bold(),
        if memories.len() == 1 { "y" } else { "ies" }
    );
    println!();
    Ok(())
}

/// Store a memory at full relevance. Unknown types are stored as `fact`.
///
/// # Examples
///
/// ```bash
/// mnemo memory add preference "prefers metric units"
/// ```
pub async fn add_memory(stores: &Stores, memory_type: &str, content: &str, json: bool) -> Result<()> {
    let content = content.trim();
    if content.is_empty() {
        bail!("memory content must not be empty");
    }

    let item = MemoryItem::new(content, MemoryType::parse_lenient(memory_type), MANUAL_RELEVANCE);
    stores.memories.save(&item).await.context("saving memory")?;
    tracing::info!(memory_id = %item.id, memory_type = %item.memory_type, "memory added");

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_added(&item);
    }
    Ok(())
}

pub fn print_added(item: &MemoryItem) {
    println!(
        "  {} Memory added [{}]: {}",
        style("✓").green().bold(),
        item.memory_type,
        style(&item.content).dim()
    );
}

/// Delete one memory by id.
pub async fn delete_memory(stores: &Stores, id: &str, json: bool) -> Result<()> {
    match stores.memories.delete(id).await {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => bail!("Memory '{id}' not found"),
        Err(e) => return Err(e).with_context(|| format!("deleting memory '{id}'")),
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("  {} Memory deleted: {}", style("✓").green().bold(), style(id).dim());
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
