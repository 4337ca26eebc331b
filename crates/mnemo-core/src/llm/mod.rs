//! LLM provider abstractions for mnemo.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `token_estimate`: the character-based token heuristic

pub mod box_provider;
pub mod provider;
pub mod token_estimate;
