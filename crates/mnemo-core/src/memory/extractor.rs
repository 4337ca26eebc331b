//! Memory extraction from summarized history.
//!
//! After a successful compaction the removed messages are sent to the model,
//! which answers with one `<type>: <content>` line per fact worth keeping.
//! Lines without a colon or with blank content are ignored; unknown types
//! become `fact`.

use tracing::Instrument;

use mnemo_types::llm::{CompletionRequest, LlmError, Message};
use mnemo_types::memory::{EXTRACTED_RELEVANCE, MemoryItem, MemoryType};

use super::summarizer::format_transcript;
use crate::llm::box_provider::BoxLlmProvider;

/// System prompt for the memory extraction LLM call.
const EXTRACTION_SYSTEM_PROMPT: &str = "Extract important facts, preferences, or context from this conversation that should be remembered for future interactions.
Return each fact on a new line, prefixed with its type (fact/preference/context).
Example:
fact: User's name is Alice
preference: User prefers concise responses
context: Working on a Rust project";

/// Stateless utility for extracting memories from conversation messages.
pub struct MemoryExtractor;

impl MemoryExtractor {
    #[tracing::instrument(
        name = "extract_memory",
        skip(provider, messages),
        fields(model = %model, message_count = messages.len())
    )]
    pub async fn extract(
        provider: &BoxLlmProvider,
        messages: &[Message],
        model: &str,
    ) -> Result<Vec<MemoryItem>, LlmError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest::new(
            model,
            vec![
                Message::system(EXTRACTION_SYSTEM_PROMPT),
                Message::user(format_transcript(messages)),
            ],
        );

        let span = tracing::info_span!(
            "gen_ai.extract",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
        );
        let response = provider.complete(&request).instrument(span).await?;
        Ok(Self::parse(&response.content))
    }

    /// Parse `<type>: <content>` lines into memory items at extraction relevance.
    pub fn parse(text: &str) -> Vec<MemoryItem> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| line.split_once(':'))
            .filter_map(|(kind, content)| {
                let content = content.trim();
                if content.is_empty() {
                    return None;
                }
                Some(MemoryItem::new(
                    content,
                    MemoryType::parse_lenient(kind),
                    EXTRACTED_RELEVANCE,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_lines() {
        let items = MemoryExtractor::parse(
            "fact: User's name is Alice\npreference: Prefers concise answers\n\ncontext: Building a CLI",
        );
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].memory_type, MemoryType::Fact);
        assert_eq!(items[0].content, "User's name is Alice");
        assert_eq!(items[1].memory_type, MemoryType::Preference);
        assert_eq!(items[2].memory_type, MemoryType::Context);
        assert!(items.iter().all(|i| i.relevance == EXTRACTED_RELEVANCE));
    }

    #[test]
    fn test_parse_unknown_type_defaults_to_fact() {
        let items = MemoryExtractor::parse("decision: Use PostgreSQL");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].memory_type, MemoryType::Fact);
        assert_eq!(items[0].content, "Use PostgreSQL");
    }

    #[test]
    fn test_parse_splits_at_first_colon_only() {
        let items = MemoryExtractor::parse("context: meeting at 10:30");
        assert_eq!(items[0].content, "meeting at 10:30");
    }

    #[test]
    fn test_parse_ignores_lines_without_colon_or_content() {
        let items = MemoryExtractor::parse("Here are the facts\nfact:   \n  \nfact: ok");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "ok");
    }
}
