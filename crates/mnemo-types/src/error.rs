use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in mnemo-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("entity not found")]
    NotFound,

    #[error("invalid id: '{0}'")]
    InvalidId(String),
}

/// Errors raised while executing a single tool.
///
/// These never abort a turn: the registry folds them into a failed
/// `ToolResult` that is fed back to the model.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0} is required")]
    MissingArgument(&'static str),

    #[error("{0}")]
    Execution(String),

    #[error("command timed out after {0} seconds")]
    Timeout(u64),

    #[error("tool execution cancelled")]
    Cancelled,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors that end a conversation turn.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM completion: {0}")]
    Provider(#[from] LlmError),

    #[error("tool execution denied by user")]
    ToolDenied,

    #[error("max tool iterations reached ({0})")]
    IterationLimitExceeded(usize),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("turn cancelled")]
    Cancelled,

    #[error("turn timed out after {0} seconds")]
    Timeout(u64),
}

impl AgentError {
    /// True when the user declined a tool call. The CLI treats this as a
    /// quiet outcome rather than a failure.
    pub fn is_denied(&self) -> bool {
        matches!(self, AgentError::ToolDenied)
    }
}

/// Errors from summarization and memory extraction.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("memory extraction failed: {0}")]
    Extraction(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_messages() {
        assert_eq!(
            AgentError::IterationLimitExceeded(10).to_string(),
            "max tool iterations reached (10)"
        );
        assert_eq!(
            AgentError::ToolDenied.to_string(),
            "tool execution denied by user"
        );
        let err: AgentError = LlmError::AuthenticationFailed.into();
        assert_eq!(err.to_string(), "LLM completion: authentication failed");
    }

    #[test]
    fn test_is_denied() {
        assert!(AgentError::ToolDenied.is_denied());
        assert!(!AgentError::Cancelled.is_denied());
    }

    #[test]
    fn test_tool_error_messages() {
        assert_eq!(ToolError::MissingArgument("path").to_string(), "path is required");
        assert_eq!(
            ToolError::Timeout(30).to_string(),
            "command timed out after 30 seconds"
        );
    }
}
