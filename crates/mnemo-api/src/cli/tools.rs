//! Tool listing.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};

use mnemo_core::tool::ToolRegistry;

/// Render the registry's tools, in name order.
///
/// # Examples
///
/// ```bash
/// mnemo tools
/// ```
pub fn print_tools(registry: &ToolRegistry, json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = registry
            .list()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "safe": tool.is_safe(),
                    "parameters": tool.parameters(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Tool").fg(Color::White),
        Cell::new("Confirmation").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for tool in registry.list() {
        let confirmation = if tool.is_safe() {
            Cell::new("never").fg(Color::Green)
        } else {
            Cell::new("required").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(tool.name()).fg(Color::Cyan),
            confirmation,
            Cell::new(tool.description()).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
