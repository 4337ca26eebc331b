//! Conversation summarizer for background compaction.
//!
//! `ContextSummarizer` condenses the older part of a conversation into a
//! short summary so the stored history stays bounded while key facts and
//! decisions survive as the "Previous conversation summary" context.

use tracing::Instrument;

use mnemo_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

/// System prompt for the summarization LLM call.
const SUMMARY_SYSTEM_PROMPT: &str = "Summarize the following conversation concisely, preserving key facts, decisions, and context. Be brief but comprehensive.";

/// Most recent messages kept verbatim when compacting.
pub const DEFAULT_KEEP_RECENT: usize = 10;

/// Format messages as `role: content` blocks separated by blank lines.
pub fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Stateless utility for summarizing conversation history.
pub struct ContextSummarizer;

impl ContextSummarizer {
    /// Summarize `messages`, folding in the summary of anything compacted
    /// earlier so repeated compaction does not forget older history.
    #[tracing::instrument(
        name = "summarize_context",
        skip(provider, messages, previous_summary),
        fields(
            model = %model,
            message_count = messages.len(),
        )
    )]
    pub async fn summarize(
        provider: &BoxLlmProvider,
        messages: &[Message],
        previous_summary: &str,
        model: &str,
    ) -> Result<String, LlmError> {
        if messages.is_empty() {
            return Ok(String::new());
        }

        let mut transcript = String::new();
        if !previous_summary.trim().is_empty() {
            transcript.push_str(&format!("Earlier summary: {}\n\n", previous_summary.trim()));
        }
        transcript.push_str(&format_transcript(messages));

        let request = CompletionRequest::new(
            model,
            vec![
                Message::system(SUMMARY_SYSTEM_PROMPT),
                Message::user(transcript),
            ],
        );

        let span = tracing::info_span!(
            "gen_ai.summarize",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
        );
        let response = provider.complete(&request).instrument(span).await?;
        Ok(response.content.trim().to_string())
    }

    /// How many recent messages to keep for a given summarization threshold.
    ///
    /// Always [`DEFAULT_KEEP_RECENT`] once the threshold exceeds it. Lower
    /// thresholds keep one message fewer than the threshold so a
    /// conversation that reaches it still has something to summarize.
    pub fn keep_recent_for(summarize_when: usize) -> usize {
        DEFAULT_KEEP_RECENT
            .min(summarize_when.saturating_sub(1))
            .max(1)
    }

    /// Split messages into two slices: those to summarize, and those to keep.
    ///
    /// Returns `(to_summarize, to_keep)` where `to_keep` contains the most
    /// recent `keep_recent` messages and `to_summarize` contains everything
    /// before them.
    pub fn select_messages_to_summarize(
        messages: &[Message],
        keep_recent: usize,
    ) -> (&[Message], &[Message]) {
        if messages.len() <= keep_recent {
            (&[], messages)
        } else {
            let split_point = messages.len() - keep_recent;
            (&messages[..split_point], &messages[split_point..])
        }
    }
}
