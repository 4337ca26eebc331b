//! Agent execution: the conversation-turn orchestrator and system prompt
//! assembly.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{ConfirmHook, Orchestrator, OrchestratorSettings, StreamSink, format_tool_call};
pub use prompt::PromptEnhancer;
