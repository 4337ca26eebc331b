//! Skill CLI commands.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use mnemo_types::skill::Skill;

/// Render skills as a table (or JSON).
///
/// # Examples
///
/// ```bash
/// mnemo skill list
/// ```
pub fn print_skills(skills: &[Skill], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(skills)?);
        return Ok(());
    }

    if skills.is_empty() {
        println!();
        println!("  {} No skills found.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Triggers").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for skill in skills {
        let status = if skill.enabled {
            Cell::new("enabled").fg(Color::Green)
        } else {
            Cell::new("disabled").fg(Color::DarkGrey)
        };
        let triggers: Vec<&str> = skill.trigger_patterns().map(|(_, pattern)| pattern).collect();
        table.add_row(vec![
            Cell::new(&skill.id).fg(Color::Cyan),
            Cell::new(&skill.name).fg(Color::White),
            status,
            Cell::new(if triggers.is_empty() { "-".to_string() } else { triggers.join(", ") })
                .fg(Color::DarkGrey),
            Cell::new(&skill.description).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
