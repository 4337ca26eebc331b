//! CLI command definitions and dispatch for the `mnemo` binary.
//!
//! Uses clap derive macros for argument parsing. Positional words form a
//! single-shot prompt; with no prompt and no subcommand the interactive chat
//! loop starts.

pub mod ask;
pub mod chat;
pub mod config;
pub mod confirm;
pub mod conversation;
pub mod memory;
pub mod skill;
pub mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// AI agent with persistent conversations and long-term memory.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Prompt to send in single-shot mode. Words are joined with spaces.
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Config file (default: ~/.mnemo/config.toml).
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Conversation to use.
    #[arg(short = 'C', long, global = true, default_value = "default")]
    pub conversation: String,

    /// Print the reply once complete instead of as it arrives.
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Approve every tool call without asking (single-shot mode).
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The positional prompt, or `None` when interactive mode was requested.
    pub fn prompt_text(&self) -> Option<String> {
        let text = self.prompt.join(" ");
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Log filter derived from `-v`/`--quiet`, or `None` to use the config.
    pub fn log_level_override(&self) -> Option<&'static str> {
        match self.verbose {
            0 if self.quiet => Some("error"),
            0 => None,
            1 => Some("info,mnemo_core=debug,mnemo_infra=debug,mnemo=debug"),
            _ => Some("trace"),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// List conversations.
    #[command(alias = "ls")]
    List,

    /// Delete a conversation.
    #[command(alias = "rm")]
    Delete {
        /// Conversation id.
        id: String,
    },

    /// Manage long-term memories.
    Memory {
        #[command(subcommand)]
        action: MemoryCommand,
    },

    /// Manage skills.
    Skill {
        #[command(subcommand)]
        action: SkillCommand,
    },

    /// List the tools available to the agent.
    Tools,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a new config file interactively.
    Init,
    /// Print the effective configuration (without the API key).
    Show,
}

#[derive(Subcommand, Debug)]
pub enum MemoryCommand {
    /// List all memories.
    List,
    /// Add a memory.
    Add {
        /// One of fact, preference, context (anything else is stored as fact).
        #[arg(value_name = "TYPE")]
        memory_type: String,
        /// Memory text. Words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Delete a memory by id.
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SkillCommand {
    /// List all skills.
    List,
}
