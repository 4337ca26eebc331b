//! Sliding-window selection of conversation history.

use mnemo_types::llm::Message;

use crate::llm::token_estimate::{estimate_text_tokens, estimate_tokens};

/// Tokens held back for the model's reply.
pub const RESPONSE_RESERVE_TOKENS: i64 = 500;

/// The most recent messages that fit the token budget, in chronological order.
///
/// The budget is `max_tokens - tokens(user_input) - 500`. Messages are taken
/// newest first and the walk stops at the first one that does not fit, or
/// once `max_messages` have been taken.
pub fn select_window(
    history: &[Message],
    user_input: &str,
    max_tokens: usize,
    max_messages: usize,
) -> Vec<Message> {
    let budget = max_tokens as i64 - estimate_text_tokens(user_input) as i64 - RESPONSE_RESERVE_TOKENS;

    let mut taken = 0usize;
    let mut used: i64 = 0;
    for message in history.iter().rev() {
        if taken >= max_messages {
            break;
        }
        let cost = estimate_tokens(message) as i64;
        if used + cost > budget {
            break;
        }
        used += cost;
        taken += 1;
    }

    history[history.len() - taken..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize, content_len: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                let body = format!("{i:0>width$}", width = content_len);
                if i % 2 == 0 {
                    Message::user(body)
                } else {
                    Message::assistant(body)
                }
            })
            .collect()
    }

    #[test]
    fn test_everything_fits() {
        let msgs = history(4, 8);
        let window = select_window(&msgs, "hi", 4000, 50);
        assert_eq!(window, msgs);
    }

    #[test]
    fn test_max_messages_caps_window() {
        let msgs = history(10, 8);
        let window = select_window(&msgs, "hi", 4000, 3);
        assert_eq!(window, msgs[7..].to_vec());
    }

    #[test]
    fn test_budget_keeps_newest_in_order() {
        // Each message costs 100/4 + 4 = 29 tokens; budget = 600 - 4 - 500 = 96.
        let msgs = history(5, 100);
        let window = select_window(&msgs, "", 600, 50);
        assert_eq!(window.len(), 3);
        assert_eq!(window, msgs[2..].to_vec());
    }

    #[test]
    fn test_stops_at_first_oversized_message() {
        let mut msgs = history(3, 8);
        msgs.insert(1, Message::user("x".repeat(10_000)));
        let window = select_window(&msgs, "", 1000, 50);
        assert_eq!(window, msgs[2..].to_vec());
    }

    #[test]
    fn test_negative_budget_yields_empty_window() {
        let msgs = history(3, 8);
        assert!(select_window(&msgs, "hello", 100, 50).is_empty());
    }
}
