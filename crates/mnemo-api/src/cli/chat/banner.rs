//! Welcome banner for the chat loop.

use console::style;

/// Print the banner shown when the chat loop starts.
pub fn print_welcome_banner(name: &str, model: &str, conversation_id: &str) {
    println!();
    println!(
        "  {} ready. Type your message (Ctrl+C or /exit to exit).",
        style(name).cyan().bold()
    );
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}  {}",
        style("Conversation:").bold(),
        style(conversation_id).dim()
    );
    println!();
    println!("  {}", style("Type /help for commands").dim());
    println!("  {}", style("---").dim());
    println!();
}
