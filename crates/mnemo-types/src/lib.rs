//! Shared domain types for mnemo.
//!
//! Conversations, messages, memories, skills, tool calls, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod memory;
pub mod skill;
pub mod tool;
