//! External process execution shared by the command tools.
//!
//! Commands run with `tokio::process`, stdout and stderr combined, bounded by
//! a per-command timeout and by the turn's cancellation token. The child is
//! killed when either fires.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use mnemo_types::error::ToolError;

/// Output cap for ordinary command tools.
pub const COMMAND_OUTPUT_LIMIT: usize = 10_000;

/// Default per-command timeout.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

const TRUNCATION_MARKER: &str = "\n... (output truncated)";

/// Run `program` with `args` and return its trimmed, capped output.
///
/// A non-zero exit status is an error carrying whatever the command printed.
pub async fn run_command(
    program: &str,
    args: &[String],
    timeout_secs: u64,
    output_limit: usize,
    cancel: &CancellationToken,
) -> Result<String, ToolError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| ToolError::Execution(format!("command failed: {e}")))?;

    let output = tokio::select! {
        result = tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output()) => {
            match result {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => return Err(ToolError::Execution(format!("command failed: {e}"))),
                Err(_) => return Err(ToolError::Timeout(timeout_secs)),
            }
        }
        _ = cancel.cancelled() => return Err(ToolError::Cancelled),
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let text = truncate_output(combined.trim(), output_limit);

    if !output.status.success() {
        tracing::debug!(program, status = %output.status, "command exited unsuccessfully");
        return Err(ToolError::Execution(if text.is_empty() {
            format!("command failed: {}", output.status)
        } else {
            format!("command failed: {}\n{text}", output.status)
        }));
    }

    Ok(text)
}

/// Cut `value` to at most `limit` bytes on a char boundary, appending a
/// marker when anything was dropped.
pub fn truncate_output(value: &str, limit: usize) -> String {
    if value.len() <= limit {
        return value.to_string();
    }
    let mut end = limit;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{TRUNCATION_MARKER}", &value[..end])
}
