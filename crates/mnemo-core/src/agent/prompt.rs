//! System prompt assembly.
//!
//! The system message is the configured base prompt, the current local
//! date and time, and whatever the prompt enhancer (the skill registry)
//! appends for this input.

use chrono::{DateTime, Local, TimeZone};

/// Appends input-specific context to the system prompt.
pub trait PromptEnhancer: Send + Sync {
    /// Return `base_prompt` extended for `input`, or unchanged.
    fn enhance_prompt(&self, input: &str, base_prompt: &str) -> String;
}

/// Human-readable timestamp, e.g. `Monday, January 2, 2006 at 3:04 PM MST`.
pub fn format_timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d, %Y at %-I:%M %p %Z").to_string()
}

/// Build the system prompt for one turn.
pub fn build_system_prompt(
    base_prompt: &str,
    user_input: &str,
    enhancer: Option<&dyn PromptEnhancer>,
) -> String {
    build_system_prompt_at(base_prompt, user_input, enhancer, &Local::now())
}

pub fn build_system_prompt_at<Tz>(
    base_prompt: &str,
    user_input: &str,
    enhancer: Option<&dyn PromptEnhancer>,
    now: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let with_time = format!(
        "{base_prompt}\n\nCurrent date and time: {}",
        format_timestamp(now)
    );
    match enhancer {
        Some(enhancer) => enhancer.enhance_prompt(user_input, &with_time),
        None => with_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    struct Suffix;

    impl PromptEnhancer for Suffix {
        fn enhance_prompt(&self, input: &str, base_prompt: &str) -> String {
            if input.contains("code") {
                format!("{base_prompt}\n\nAdditional context from skills:\nWrite good code.")
            } else {
                base_prompt.to_string()
            }
        }
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(&at), "Monday, January 2, 2006 at 3:04 PM UTC");
    }

    #[test]
    fn test_format_timestamp_fixed_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2024, 11, 30, 9, 5, 0).unwrap();
        assert_eq!(format_timestamp(&at), "Saturday, November 30, 2024 at 9:05 AM +02:00");
    }

    #[test]
    fn test_build_system_prompt_appends_time_then_skills() {
        let at = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        let plain = build_system_prompt_at("Be helpful.", "hi", Some(&Suffix), &at);
        assert_eq!(
            plain,
            "Be helpful.\n\nCurrent date and time: Monday, January 2, 2006 at 3:04 PM UTC"
        );

        let enhanced = build_system_prompt_at("Be helpful.", "write code", Some(&Suffix), &at);
        assert!(enhanced.starts_with("Be helpful.\n\nCurrent date and time: "));
        assert!(enhanced.ends_with("Additional context from skills:\nWrite good code."));
    }
}
