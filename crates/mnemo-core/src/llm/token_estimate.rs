//! Cheap token estimation.
//!
//! Exactness is not a goal: the estimate only has to be monotonic in message
//! length so the sliding window can stay under a rough budget.

use mnemo_types::llm::{CompletionRequest, Message};

/// Per-message overhead for role and framing.
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Estimate the tokens a text occupies (about four characters per token).
pub fn estimate_text_tokens(text: &str) -> usize {
    text.len() / 4 + MESSAGE_OVERHEAD_TOKENS
}

/// Estimate the tokens a message occupies: `len(content) / 4 + 4`.
pub fn estimate_tokens(message: &Message) -> usize {
    estimate_text_tokens(&message.content)
}

/// Sum of [`estimate_tokens`] over every message in a request.
pub fn estimate_request_tokens(request: &CompletionRequest) -> usize {
    request.messages.iter().map(estimate_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_costs_overhead() {
        assert_eq!(estimate_tokens(&Message::user("")), 4);
    }

    #[test]
    fn test_estimate_scales_with_length() {
        assert_eq!(estimate_tokens(&Message::user("a".repeat(400))), 104);
        assert_eq!(estimate_tokens(&Message::assistant("abc")), 4);
    }

    #[test]
    fn test_request_estimate_sums_messages() {
        let request = CompletionRequest::new(
            "m",
            vec![Message::system("a".repeat(40)), Message::user("a".repeat(8))],
        );
        assert_eq!(estimate_request_tokens(&request), 14 + 6);
    }
}
