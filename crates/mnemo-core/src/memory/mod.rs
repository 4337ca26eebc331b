//! Context and long-term memory management for mnemo.
//!
//! `MemoryManager` assembles each turn's context from recalled memories, the
//! rolling conversation summary, and a token-bounded window of recent
//! history, and runs summarization/extraction in the background.

pub mod extractor;
pub mod manager;
pub mod recall;
pub mod summarizer;
pub mod window;

pub use manager::{MemoryManager, MemorySettings};
