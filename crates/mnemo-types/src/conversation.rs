//! Conversation record types for mnemo.
//!
//! A conversation is the persisted history the context manager draws its
//! sliding window from, plus the rolling summary that replaces messages
//! compacted away by background summarization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Conversation id used when the caller does not pick one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// A persisted conversation.
///
/// `messages` are in insertion (chronological) order. They are only ever
/// appended to, except when summarization drops a summarized prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            summary: String::new(),
        }
    }

    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}
