//! Infrastructure layer for mnemo.
//!
//! Contains implementations of the ports defined in `mnemo-core`: JSON file
//! repositories for conversations, memories, and skills, the
//! OpenAI-compatible LLM provider, and configuration loading.

pub mod config;
pub mod json;
pub mod llm;
