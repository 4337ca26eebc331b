//! Typed accessors over a tool call's argument map.
//!
//! The model sends loosely typed JSON; these helpers apply the defaults and
//! clamps each tool documents in its schema.

use mnemo_types::error::ToolError;
use mnemo_types::tool::ToolInvocation;

/// A non-empty string argument, or `MissingArgument`.
pub fn required_str<'a>(call: &'a ToolInvocation, key: &'static str) -> Result<&'a str, ToolError> {
    match call.str_arg(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ToolError::MissingArgument(key)),
    }
}

/// A string argument, treating empty strings as absent.
pub fn optional_str<'a>(call: &'a ToolInvocation, key: &str) -> Option<&'a str> {
    call.str_arg(key).filter(|value| !value.is_empty())
}

pub fn bool_or(call: &ToolInvocation, key: &str, default: bool) -> bool {
    call.arguments
        .get(key)
        .and_then(|value| value.as_bool())
        .unwrap_or(default)
}

/// A positive integer argument, capped at `max`. Zero, negative, and
/// non-numeric values fall back to `default`.
pub fn positive_int_or(call: &ToolInvocation, key: &str, default: u64, max: u64) -> u64 {
    call.arguments
        .get(key)
        .and_then(|value| value.as_f64())
        .filter(|value| *value >= 1.0)
        .map(|value| (value as u64).min(max))
        .unwrap_or(default)
}

pub fn f64_arg(call: &ToolInvocation, key: &str) -> Option<f64> {
    call.arguments.get(key).and_then(|value| value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(raw: &str) -> ToolInvocation {
        ToolInvocation::parse("c1", "t", raw).unwrap()
    }

    #[test]
    fn test_required_str() {
        assert_eq!(required_str(&call(r#"{"path":"/tmp"}"#), "path").unwrap(), "/tmp");
        let err = required_str(&call(r#"{"path":""}"#), "path").unwrap_err();
        assert_eq!(err.to_string(), "path is required");
        assert!(required_str(&call(r#"{"path":3}"#), "path").is_err());
    }

    #[test]
    fn test_positive_int_defaults_and_clamps() {
        assert_eq!(positive_int_or(&call("{}"), "lines", 10, 100), 10);
        assert_eq!(positive_int_or(&call(r#"{"lines":25}"#), "lines", 10, 100), 25);
        assert_eq!(positive_int_or(&call(r#"{"lines":500}"#), "lines", 10, 100), 100);
        assert_eq!(positive_int_or(&call(r#"{"lines":0}"#), "lines", 10, 100), 10);
        assert_eq!(positive_int_or(&call(r#"{"lines":-3}"#), "lines", 10, 100), 10);
    }

    #[test]
    fn test_bool_or() {
        assert!(bool_or(&call("{}"), "long", true));
        assert!(!bool_or(&call(r#"{"long":false}"#), "long", true));
        assert!(bool_or(&call(r#"{"long":"no"}"#), "long", true));
    }
}
