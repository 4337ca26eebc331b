//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for conversations,
//! memories, skills, and tools.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Start (or open) a conversation; `None` means `default`.
    New(Option<String>),
    /// List conversations.
    List,
    /// Switch to another conversation.
    Switch(String),
    /// Delete a conversation.
    Delete(String),
    /// List memories.
    Memories,
    /// Store a memory.
    Remember { memory_type: String, content: String },
    /// List skills.
    Skills,
    /// List tools.
    Tools,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Known command with missing arguments; carries the usage line.
    Usage(&'static str),
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let arg = parts.get(1).map(|s| s.to_string());

    let command = match parts[0] {
        "/help" => ChatCommand::Help,
        "/new" => ChatCommand::New(arg),
        "/list" => ChatCommand::List,
        "/switch" => match arg {
            Some(id) => ChatCommand::Switch(id),
            None => ChatCommand::Usage("/switch <conversation-id>"),
        },
        "/delete" => match arg {
            Some(id) => ChatCommand::Delete(id),
            None => ChatCommand::Usage("/delete <conversation-id>"),
        },
        "/memory" if parts.get(1) == Some(&"add") => {
            if parts.len() < 4 {
                ChatCommand::Usage("/memory add <type> <content>")
            } else {
                ChatCommand::Remember {
                    memory_type: parts[2].to_string(),
                    content: parts[3..].join(" "),
                }
            }
        }
        "/memory" => ChatCommand::Memories,
        "/skills" => ChatCommand::Skills,
        "/tools" => ChatCommand::Tools,
        "/clear" => ChatCommand::Clear,
        "/exit" => ChatCommand::Exit,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help"),
        ("/new [name]", "Start a new conversation"),
        ("/list", "List conversations"),
        ("/switch <id>", "Switch to a conversation"),
        ("/delete <id>", "Delete a conversation"),
        ("/memory", "List memories"),
        ("/memory add <type> <content>", "Add memory"),
        ("/skills", "List skills"),
        ("/tools", "List available tools"),
        ("/clear", "Clear screen"),
        ("/exit", "Exit"),
    ];

    println!();
    println!("  {}", style("Commands:").bold());
    for (usage, description) in rows {
        println!("  {} {}", style(format!("{usage:<30}")).cyan(), description);
    }
    println!();
    println!("  {}", style("UP/DOWN arrows navigate message history").dim());
    println!();
}
