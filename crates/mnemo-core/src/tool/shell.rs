//! The `shell` tool: arbitrary `/bin/sh -c` commands.
//!
//! Never safe; the orchestrator always routes it through confirmation.

use std::path::Path;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use mnemo_types::error::ToolError;
use mnemo_types::tool::ToolInvocation;

use super::Tool;
use super::args::{positive_int_or, required_str};
use super::process::{DEFAULT_COMMAND_TIMEOUT_SECS, run_command};

pub const SHELL_TOOL_NAME: &str = "shell";

const MAX_SHELL_TIMEOUT_SECS: u64 = 120;
const SHELL_OUTPUT_LIMIT: usize = 15_000;

pub struct ShellTool;

impl ShellTool {
    fn interpreter() -> &'static str {
        if Path::new("/bin/sh").exists() {
            "/bin/sh"
        } else {
            "sh"
        }
    }
}

impl Tool for ShellTool {
    fn name(&self) -> &str {
        SHELL_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Execute a shell command. Supports pipes (|), redirections (>), and other shell features. Use this for complex commands that need shell processing."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute (supports pipes, redirections, etc.)"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Timeout in seconds (default: 30, max: 120)"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let command = required_str(call, "command")?;
        let timeout = positive_int_or(
            call,
            "timeout",
            DEFAULT_COMMAND_TIMEOUT_SECS,
            MAX_SHELL_TIMEOUT_SECS,
        );
        tracing::debug!(command, timeout, "running shell command");
        run_command(
            Self::interpreter(),
            &["-c".to_string(), command.to_string()],
            timeout,
            SHELL_OUTPUT_LIMIT,
            cancel,
        )
        .await
    }
}
