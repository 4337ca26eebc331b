//! Built-in system tools.
//!
//! Most wrap a standard Unix command through [`run_command`]; `date`, `cat`,
//! `pwd`, `echo`, and `env` are served in-process.

use std::fmt::Write as _;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use mnemo_types::error::ToolError;
use mnemo_types::tool::ToolInvocation;

use super::Tool;
use super::args::{bool_or, optional_str, positive_int_or, required_str};
use super::process::{COMMAND_OUTPUT_LIMIT, DEFAULT_COMMAND_TIMEOUT_SECS, run_command};

const CAT_MAX_LINES: usize = 1000;
const DEFAULT_LINES: u64 = 10;
const MAX_LINES: u64 = 100;

/// RFC 1123 layout, e.g. `Mon, 02 Jan 2006 15:04:05 MST`.
const DEFAULT_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

async fn run(program: &str, args: Vec<String>, cancel: &CancellationToken) -> Result<String, ToolError> {
    run_command(
        program,
        &args,
        DEFAULT_COMMAND_TIMEOUT_SECS,
        COMMAND_OUTPUT_LIMIT,
        cancel,
    )
    .await
}

fn path_and_lines_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": { "type": "string", "description": "Path to the file" },
            "lines": {
                "type": "integer",
                "description": "Number of lines to read (default: 10, max: 100)"
            }
        },
        "required": ["path"]
    })
}

pub struct DateTool;

impl Tool for DateTool {
    fn name(&self) -> &str {
        "date"
    }

    fn description(&self) -> &str {
        "Get the current date and time. Use a strftime format string to customize output."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "description": "Optional strftime format string (e.g., '%Y-%m-%d', '%H:%M:%S')"
                }
            }
        })
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let format = optional_str(call, "format").unwrap_or(DEFAULT_DATE_FORMAT);
        let mut out = String::new();
        // chrono reports bad specifiers as a fmt error rather than panicking here.
        write!(out, "{}", chrono::Local::now().format(format))
            .map_err(|_| ToolError::InvalidArguments(format!("invalid date format: {format}")))?;
        Ok(out)
    }
}

pub struct LsTool;

impl Tool for LsTool {
    fn name(&self) -> &str {
        "ls"
    }

    fn description(&self) -> &str {
        "List files and directories in a given path. Returns detailed listing with permissions, size, and modification time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Directory path to list (default: current directory)" },
                "long": { "type": "boolean", "description": "Use long format with details (default: true)" },
                "all": { "type": "boolean", "description": "Show hidden files (default: false)" }
            }
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let mut args = Vec::new();
        if bool_or(call, "long", true) {
            args.push("-l".to_string());
        }
        if bool_or(call, "all", false) {
            args.push("-a".to_string());
        }
        args.push(optional_str(call, "path").unwrap_or(".").to_string());
        run("ls", args, cancel).await
    }
}

pub struct CatTool;

impl Tool for CatTool {
    fn name(&self) -> &str {
        "cat"
    }

    fn description(&self) -> &str {
        "Read and return the contents of a file. Limited to first 1000 lines for safety."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Path to the file to read" }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let path = required_str(call, "path")?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolError::Execution(format!("reading {path}: {e}")))?;
        Ok(limit_lines(&content, CAT_MAX_LINES))
    }
}

fn limit_lines(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() > max_lines {
        format!(
            "{}\n... (truncated, file has more lines)",
            lines[..max_lines].join("\n")
        )
    } else {
        content.to_string()
    }
}

pub struct PwdTool;

impl Tool for PwdTool {
    fn name(&self) -> &str {
        "pwd"
    }

    fn description(&self) -> &str {
        "Get the current working directory."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, _call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}

pub struct PsTool;

impl Tool for PsTool {
    fn name(&self) -> &str {
        "ps"
    }

    fn description(&self) -> &str {
        "List running processes. Shows process ID, CPU usage, memory usage, and command."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "all": { "type": "boolean", "description": "Show all processes, not just user's (default: false)" }
            }
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let mut args = Vec::new();
        if bool_or(call, "all", false) {
            args.push("-e".to_string());
        }
        args.extend(["-o".to_string(), "pid,pcpu,pmem,comm".to_string()]);
        run("ps", args, cancel).await
    }
}

pub struct CurlTool;

impl CurlTool {
    fn build_args(call: &ToolInvocation) -> Result<(Vec<String>, u64), ToolError> {
        let url = required_str(call, "url")?;
        // Silent, but include response headers.
        let mut args = vec!["-s".to_string(), "-i".to_string()];

        if let Some(method) = optional_str(call, "method") {
            args.extend(["-X".to_string(), method.to_uppercase()]);
        }
        if let Some(headers) = call.arguments.get("headers").and_then(Value::as_object) {
            for (key, value) in headers {
                if let Some(value) = value.as_str() {
                    args.extend(["-H".to_string(), format!("{key}: {value}")]);
                }
            }
        }
        if let Some(data) = optional_str(call, "data") {
            args.extend(["-d".to_string(), data.to_string()]);
        }

        let timeout = positive_int_or(call, "timeout", DEFAULT_COMMAND_TIMEOUT_SECS, 300);
        args.extend(["--max-time".to_string(), timeout.to_string()]);
        args.push(url.to_string());
        Ok((args, timeout))
    }
}

impl Tool for CurlTool {
    fn name(&self) -> &str {
        "curl"
    }

    fn description(&self) -> &str {
        "Make HTTP requests to URLs. Supports GET, POST, and other methods. Returns response body and status."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The URL to request" },
                "method": {
                    "type": "string",
                    "description": "HTTP method (GET, POST, PUT, DELETE, etc.)",
                    "enum": ["GET", "POST", "PUT", "DELETE", "HEAD", "PATCH"]
                },
                "headers": { "type": "object", "description": "HTTP headers as key-value pairs" },
                "data": { "type": "string", "description": "Request body data (for POST, PUT, PATCH)" },
                "timeout": { "type": "integer", "description": "Request timeout in seconds (default: 30)" }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let (args, timeout) = Self::build_args(call)?;
        // curl enforces --max-time itself; the outer bound leaves it room to report.
        run_command("curl", &args, timeout + 5, COMMAND_OUTPUT_LIMIT, cancel).await
    }
}

pub struct WhichTool;

impl Tool for WhichTool {
    fn name(&self) -> &str {
        "which"
    }

    fn description(&self) -> &str {
        "Find the full path to a command."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": { "type": "string", "description": "The command to find" }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let command = required_str(call, "command")?;
        run("which", vec![command.to_string()], cancel).await
    }
}

pub struct EchoTool;

impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the input text. Useful for testing tool functionality."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to echo" }
            },
            "required": ["text"]
        })
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        // Empty text is valid here; only a missing or non-string value fails.
        call.str_arg("text")
            .map(str::to_string)
            .ok_or(ToolError::MissingArgument("text"))
    }
}

pub struct EnvTool;

impl Tool for EnvTool {
    fn name(&self) -> &str {
        "env"
    }

    fn description(&self) -> &str {
        "List environment variables. Can optionally filter by name pattern."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filter": { "type": "string", "description": "Optional filter pattern (substring match)" }
            }
        })
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let filter = optional_str(call, "filter").map(str::to_lowercase);
        let lines: Vec<String> = std::env::vars()
            .map(|(key, value)| format!("{key}={value}"))
            .filter(|entry| {
                filter
                    .as_deref()
                    .is_none_or(|f| entry.to_lowercase().contains(f))
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

pub struct HeadTool;

impl Tool for HeadTool {
    fn name(&self) -> &str {
        "head"
    }

    fn description(&self) -> &str {
        "Read the first N lines of a file."
    }

    fn parameters(&self) -> Value {
        path_and_lines_schema()
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let path = required_str(call, "path")?;
        let lines = positive_int_or(call, "lines", DEFAULT_LINES, MAX_LINES);
        run("head", vec!["-n".to_string(), lines.to_string(), path.to_string()], cancel).await
    }
}

pub struct TailTool;

impl Tool for TailTool {
    fn name(&self) -> &str {
        "tail"
    }

    fn description(&self) -> &str {
        "Read the last N lines of a file."
    }

    fn parameters(&self) -> Value {
        path_and_lines_schema()
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let path = required_str(call, "path")?;
        let lines = positive_int_or(call, "lines", DEFAULT_LINES, MAX_LINES);
        run("tail", vec!["-n".to_string(), lines.to_string(), path.to_string()], cancel).await
    }
}

pub struct DfTool;

impl Tool for DfTool {
    fn name(&self) -> &str {
        "df"
    }

    fn description(&self) -> &str {
        "Show disk space usage for file systems."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "human": { "type": "boolean", "description": "Show sizes in human readable format (default: true)" }
            }
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let args = if bool_or(call, "human", true) {
            vec!["-h".to_string()]
        } else {
            Vec::new()
        };
        run("df", args, cancel).await
    }
}

pub struct UnameTool;

impl Tool for UnameTool {
    fn name(&self) -> &str {
        "uname"
    }

    fn description(&self) -> &str {
        "Get system information (OS, kernel version, etc.)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "all": { "type": "boolean", "description": "Show all information (default: true)" }
            }
        })
    }

    async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> Result<String, ToolError> {
        let args = if bool_or(call, "all", true) {
            vec!["-a".to_string()]
        } else {
            Vec::new()
        };
        run("uname", args, cancel).await
    }
}
