//! Skill domain types.
//!
//! A skill is a named prompt fragment that gets appended to the system
//! prompt when the user's input matches it, either by name or by one of its
//! `trigger_*` regex parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter-key prefix marking a regex trigger pattern.
pub const TRIGGER_PREFIX: &str = "trigger_";

/// A prompt-injection skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Skill {
    /// Regex patterns declared via `trigger_*` parameters, in key order.
    pub fn trigger_patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .filter(|(k, _)| k.starts_with(TRIGGER_PREFIX))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
