//! Keyword-based memory recall.
//!
//! Candidates are filtered by a keyword-overlap score but ordered by their
//! stored relevance, not by that score.

use mnemo_types::llm::Message;
use mnemo_types::memory::MemoryItem;

/// Items below this stored relevance are never recalled.
pub const MIN_STORED_RELEVANCE: f64 = 0.3;

/// Weight of one matching query word.
const WORD_MATCH_WEIGHT: f64 = 0.2;

/// Items must score strictly above this to be recalled.
const MIN_MATCH_SCORE: f64 = 0.1;

/// Upper bound on recalled items per turn.
pub const MAX_RECALLED: usize = 5;

/// Query words shorter than this many characters plus one are ignored.
const MIN_WORD_LEN: usize = 3;

/// Heuristic match score: `0.2 * matching_words * stored_relevance`.
pub fn match_score(item: &MemoryItem, query: &str) -> f64 {
    let content = item.content.to_lowercase();
    let matches = query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_WORD_LEN && content.contains(word))
        .count();
    WORD_MATCH_WEIGHT * matches as f64 * item.relevance
}

/// Select up to [`MAX_RECALLED`] memories for `query`.
pub fn recall<'a>(items: &'a [MemoryItem], query: &str) -> Vec<&'a MemoryItem> {
    let mut relevant: Vec<&MemoryItem> = items
        .iter()
        .filter(|item| item.relevance >= MIN_STORED_RELEVANCE)
        .filter(|item| match_score(item, query) > MIN_MATCH_SCORE)
        .collect();

    // Stable sort keeps insertion order among equal relevance.
    relevant.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    relevant.truncate(MAX_RECALLED);
    relevant
}

/// The system message injecting recalled memories, if any were recalled.
pub fn recall_message(items: &[&MemoryItem]) -> Option<Message> {
    if items.is_empty() {
        return None;
    }
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("- [{}] {}", item.memory_type, item.content))
        .collect();
    Some(Message::system(format!(
        "Relevant context from memory:\n{}",
        lines.join("\n")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_types::memory::MemoryType;

    fn item(content: &str, relevance: f64) -> MemoryItem {
        MemoryItem::new(content, MemoryType::Fact, relevance)
    }

    #[test]
    fn test_short_words_do_not_match() {
        let memory = item("the cat sat on a mat", 1.0);
        assert_eq!(match_score(&memory, "the cat"), 0.0);
    }

    #[test]
    fn test_score_counts_words_case_insensitively() {
        let memory = item("User works with Rust and Tokio", 1.0);
        let score = match_score(&memory, "RUST tokio async");
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_low_relevance_items_are_excluded() {
        let items = vec![item("rust programming", 0.29), item("rust programming", 0.3)];
        let recalled = recall(&items, "rust programming");
        assert_eq!(recalled.len(), 1);
        assert_eq!(recalled[0].relevance, 0.3);
    }

    #[test]
    fn test_single_match_needs_enough_relevance() {
        // 0.2 * 1 * 0.5 = 0.1 is not strictly above the threshold.
        let items = vec![item("rust", 0.5), item("rust", 0.6)];
        let recalled = recall(&items, "rust");
        assert_eq!(recalled.len(), 1);
        assert_eq!(recalled[0].relevance, 0.6);
    }

    #[test]
    fn test_sorted_by_stored_relevance_not_score() {
        let items = vec![
            item("rust tokio serde axum", 0.7),
            item("rust", 1.0),
        ];
        let recalled = recall(&items, "rust tokio serde axum");
        assert_eq!(recalled[0].content, "rust");
        assert_eq!(recalled[1].content, "rust tokio serde axum");
    }

    #[test]
    fn test_never_more_than_five() {
        let items: Vec<MemoryItem> = (0..12)
            .map(|i| item(&format!("project detail {i}"), 0.3 + i as f64 * 0.05))
            .collect();
        let recalled = recall(&items, "project detail");
        assert_eq!(recalled.len(), MAX_RECALLED);
        assert!(recalled.iter().all(|m| m.relevance >= MIN_STORED_RELEVANCE));
        assert!(recalled.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }

    #[test]
    fn test_recall_message_format() {
        let a = MemoryItem::new("User's name is Alice", MemoryType::Fact, 1.0);
        let b = MemoryItem::new("Likes short answers", MemoryType::Preference, 1.0);
        let message = recall_message(&[&a, &b]).unwrap();
        assert_eq!(
            message.content,
            "Relevant context from memory:\n- [fact] User's name is Alice\n- [preference] Likes short answers"
        );
        assert!(recall_message(&[]).is_none());
    }
}
