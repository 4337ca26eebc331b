//! Single-shot mode: `mnemo <prompt...>` runs one turn and exits.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;

use mnemo_core::agent::StreamSink;
use mnemo_types::error::AgentError;

use crate::state::AppState;

use super::confirm::Activity;

/// Reply of one turn and whether it was already printed while streaming.
pub struct TurnOutput {
    pub reply: String,
    pub streamed: bool,
}

/// Run one turn with a spinner, printing chunks as they arrive when
/// `stream` is set. Ctrl+C cancels the turn.
pub async fn run_turn(
    state: &AppState,
    activity: &Activity,
    conversation_id: &str,
    input: &str,
    stream: bool,
) -> Result<TurnOutput, AgentError> {
    let cancel = CancellationToken::new();
    let _ctrl_c = cancel_on_ctrl_c(cancel.clone());

    activity.start("thinking...");

    let started = AtomicBool::new(false);
    let print_chunk = |chunk: &str| {
        if !started.swap(true, Ordering::SeqCst) {
            activity.finish();
        }
        print!("{chunk}");
        let _ = std::io::stdout().flush();
    };
    let sink: StreamSink<'_> = &print_chunk;

    let result = state
        .orchestrator
        .converse(conversation_id, input, &cancel, stream.then_some(sink))
        .await;
    activity.finish();

    result.map(|reply| TurnOutput {
        reply,
        streamed: started.load(Ordering::SeqCst),
    })
}

/// Run the prompt on `conversation_id` and print the reply.
pub async fn run_prompt(
    state: &AppState,
    activity: &Activity,
    conversation_id: &str,
    prompt: &str,
    stream: bool,
    json: bool,
) -> anyhow::Result<()> {
    match run_turn(state, activity, conversation_id, prompt, stream && !json).await {
        Ok(output) => {
            if json {
                let out = serde_json::json!({
                    "conversation": conversation_id,
                    "reply": output.reply,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if output.streamed {
                println!();
            } else {
                println!("{}", output.reply);
            }
            Ok(())
        }
        Err(e) if e.is_denied() => {
            eprintln!("  {} Tool execution denied.", style("!").yellow().bold());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Cancel `token` on Ctrl+C. Dropping the handle stops listening.
fn cancel_on_ctrl_c(token: CancellationToken) -> AbortOnDropHandle<()> {
    AbortOnDropHandle::new(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling turn");
            token.cancel();
        }
    }))
}
