//! Terminal confirmation for unsafe tool calls, plus the "thinking" spinner
//! that has to step aside while the prompt is shown.

use std::io::IsTerminal;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use mnemo_core::agent::{ConfirmHook, format_tool_call};
use mnemo_types::tool::ToolInvocation;

/// A spinner shown while a turn is in progress. Cloning shares the spinner.
#[derive(Clone, Default)]
pub struct Activity {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl Activity {
    pub fn start(&self, message: &str) {
        let bar = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(template);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = self.slot().replace(bar) {
            old.finish_and_clear();
        }
    }

    /// Stop and erase the spinner if it is running.
    pub fn finish(&self) {
        if let Some(bar) = self.slot().take() {
            bar.finish_and_clear();
        }
    }

    /// Run `f` with the spinner hidden.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        let bar = self.slot().clone();
        match bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How unsafe tool calls are approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalMode {
    /// Ask on the terminal; deny when stdin is not a terminal.
    Ask,
    /// Approve everything (`--yes`).
    AutoApprove,
}

/// Build the orchestrator's confirmation hook.
pub fn confirmation_hook(mode: ApprovalMode, activity: Activity) -> ConfirmHook {
    Arc::new(move |call: &ToolInvocation| match mode {
        ApprovalMode::AutoApprove => {
            tracing::debug!(tool = %call.name, "tool call auto-approved");
            true
        }
        ApprovalMode::Ask => activity.suspend(|| ask(call)),
    })
}

fn ask(call: &ToolInvocation) -> bool {
    if !std::io::stdin().is_terminal() {
        tracing::warn!(tool = %call.name, "no terminal to confirm tool call; denying");
        return false;
    }

    eprintln!();
    eprintln!(
        "  {} {}",
        style("Tool call:").yellow().bold(),
        style(format_tool_call(call)).cyan()
    );

    // The orchestrator calls the hook from async code; the prompt blocks on stdin.
    let answer = tokio::task::block_in_place(|| {
        Confirm::new()
            .with_prompt("Allow execution? [y/N]")
            .default(false)
            .show_default(false)
            .interact()
    });
    match answer {
        Ok(approved) => {
            tracing::info!(tool = %call.name, approved, "tool call confirmation");
            approved
        }
        Err(e) => {
            tracing::warn!(error = %e, "confirmation prompt failed; denying");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> ToolInvocation {
        ToolInvocation::parse("c1", "shell", r#"{"command":"rm -rf /tmp/x"}"#).unwrap()
    }

    #[test]
    fn test_auto_approve_hook() {
        let hook = confirmation_hook(ApprovalMode::AutoApprove, Activity::default());
        assert!(hook(&call()));
    }

    #[test]
    fn test_activity_suspend_without_spinner_runs_closure() {
        let activity = Activity::default();
        assert_eq!(activity.suspend(|| 42), 42);
        activity.finish();
    }
}
