//! Memory types for mnemo.
//!
//! These types model the agent's long-term memory: facts, preferences,
//! and context that persist across conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Relevance assigned to memories added explicitly by the user.
pub const MANUAL_RELEVANCE: f64 = 1.0;

/// Relevance assigned to memories extracted from summarized history.
pub const EXTRACTED_RELEVANCE: f64 = 0.7;

/// Kind of a memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Fact,
    Preference,
    Context,
}

impl MemoryType {
    /// Parse a type token, falling back to [`MemoryType::Fact`] for anything
    /// unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(MemoryType::Fact)
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryType::Fact => write!(f, "fact"),
            MemoryType::Preference => write!(f, "preference"),
            MemoryType::Context => write!(f, "context"),
        }
    }
}

impl FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fact" => Ok(MemoryType::Fact),
            "preference" => Ok(MemoryType::Preference),
            "context" => Ok(MemoryType::Context),
            other => Err(format!("invalid memory type: '{other}'")),
        }
    }
}

/// A single long-term memory.
///
/// Only changed in place through an explicit update (the `memory_update`
/// tool); otherwise created once and deleted explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub created_at: DateTime<Utc>,
    /// Durable importance in `[0, 1]`.
    pub relevance: f64,
}

impl MemoryItem {
    /// Create a memory with a fresh time-sortable id.
    pub fn new(content: impl Into<String>, memory_type: MemoryType, relevance: f64) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            content: content.into(),
            memory_type,
            created_at: Utc::now(),
            relevance: relevance.clamp(0.0, 1.0),
        }
    }
}
