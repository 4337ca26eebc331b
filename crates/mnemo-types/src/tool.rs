//! Tool invocation and result types.
//!
//! A [`ToolInvocation`] is a model-requested [`ToolCall`](crate::llm::ToolCall)
//! whose raw JSON arguments have been parsed; a [`ToolResult`] is what the
//! registry hands back, keyed to the originating call id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed tool call, ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub raw_arguments: String,
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    /// Parse the raw argument text of a tool call.
    ///
    /// Empty (or whitespace-only) text yields an empty argument map. Anything
    /// that is not a JSON object is an error.
    pub fn parse(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: &str,
    ) -> Result<Self, serde_json::Error> {
        let arguments = if raw_arguments.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str::<Map<String, Value>>(raw_arguments)?
        };

        Ok(Self {
            id: id.into(),
            name: name.into(),
            raw_arguments: raw_arguments.to_string(),
            arguments,
        })
    }

    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Outcome of executing one tool call.
///
/// Exactly one of `output` (on success) or a non-empty `error` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(call: &ToolInvocation, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(call: &ToolInvocation, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "tool failed without a message".to_string();
        }
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            output: String::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The text fed back to the model as the tool-role message content.
    pub fn content_for_model(&self) -> String {
        match &self.error {
            Some(err) => format!("Error: {err}"),
            None => self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_arguments() {
        let call = ToolInvocation::parse("c1", "echo", r#"{"text":"hi"}"#).unwrap();
        assert_eq!(call.str_arg("text"), Some("hi"));
        assert_eq!(call.raw_arguments, r#"{"text":"hi"}"#);
    }

    #[test]
    fn test_parse_empty_arguments() {
        let call = ToolInvocation::parse("c1", "pwd", "  ").unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_and_non_object() {
        assert!(ToolInvocation::parse("c1", "echo", "{not json").is_err());
        assert!(ToolInvocation::parse("c1", "echo", "[1,2]").is_err());
    }

    #[test]
    fn test_result_content_for_model() {
        let call = ToolInvocation::parse("c1", "cat", "").unwrap();
        assert_eq!(ToolResult::ok(&call, "data").content_for_model(), "data");
        let failed = ToolResult::failed(&call, "path is required");
        assert!(failed.is_error());
        assert_eq!(failed.content_for_model(), "Error: path is required");
    }

    #[test]
    fn test_failed_never_has_empty_error() {
        let call = ToolInvocation::parse("c1", "cat", "").unwrap();
        let failed = ToolResult::failed(&call, "");
        assert!(!failed.error.unwrap().is_empty());
    }
}
