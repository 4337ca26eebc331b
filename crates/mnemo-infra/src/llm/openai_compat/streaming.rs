//! SSE stream to [`StreamEvent`] adapter.
//!
//! Chat-completions streams are `data:` events carrying JSON chunks and a
//! final literal `[DONE]`. Only `choices[0].delta.content` is surfaced;
//! streaming is used for tool-free turns, so tool-call deltas never occur.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource};

use mnemo_types::llm::{LlmError, StopReason, StreamEvent, Usage};

use super::error_for_status;
use super::types::ChatResponse;

/// Terminal marker sent after the last chunk.
const DONE_MARKER: &str = "[DONE]";

/// One decoded `data:` payload.
#[derive(Debug, PartialEq)]
pub(crate) enum StreamChunk {
    Events(Vec<StreamEvent>),
    Done,
}

/// Decode a single SSE `data:` payload.
pub(crate) fn parse_stream_data(data: &str) -> Result<StreamChunk, LlmError> {
    let data = data.trim();
    if data == DONE_MARKER {
        return Ok(StreamChunk::Done);
    }
    if data.is_empty() {
        return Ok(StreamChunk::Events(Vec::new()));
    }

    let chunk: ChatResponse = serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("invalid stream chunk: {e}")))?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Provider {
            message: format!("API error: {}", error.message),
        });
    }

    let mut events = Vec::new();
    if let Some(choice) = chunk.choices.into_iter().next() {
        if let Some(text) = choice.delta.and_then(|d| d.content) {
            if !text.is_empty() {
                events.push(StreamEvent::TextDelta { text });
            }
        }
        if let Some(reason) = choice.finish_reason.as_deref() {
            events.push(StreamEvent::MessageDelta {
                stop_reason: StopReason::from_finish_reason(Some(reason)),
            });
        }
    }
    if let Some(usage) = chunk.usage {
        events.push(StreamEvent::Usage(Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }));
    }
    Ok(StreamChunk::Events(events))
}

/// Drive an [`EventSource`] to completion, mapping its events.
///
/// The source never reconnects: any transport error ends the stream with
/// that error.
pub(crate) fn map_event_source(
    mut source: EventSource,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    source.set_retry_policy(Box::new(reqwest_eventsource::retry::Never));

    Box::pin(async_stream::try_stream! {
        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => yield StreamEvent::Connected,
                Ok(Event::Message(message)) => match parse_stream_data(&message.data) {
                    Ok(StreamChunk::Done) => break,
                    Ok(StreamChunk::Events(events)) => {
                        for event in events {
                            yield event;
                        }
                    }
                    Err(e) => {
                        source.close();
                        Err::<(), _>(e)?;
                    }
                },
                Err(EventSourceError::StreamEnded) => break,
                Err(EventSourceError::InvalidStatusCode(status, response)) => {
                    source.close();
                    let body = response.text().await.unwrap_or_default();
                    Err::<(), _>(error_for_status(status.as_u16(), &body))?;
                }
                Err(e) => {
                    source.close();
                    Err::<(), _>(LlmError::Stream(e.to_string()))?;
                }
            }
        }
        source.close();
        yield StreamEvent::Done;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_marker() {
        assert_eq!(parse_stream_data("[DONE]").unwrap(), StreamChunk::Done);
        assert_eq!(parse_stream_data(" [DONE]\n").unwrap(), StreamChunk::Done);
    }

    #[test]
    fn test_content_delta() {
        let chunk = parse_stream_data(
            r#"{"id":"c","choices":[{"index":0,"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        )
        .unwrap();
        let StreamChunk::Events(events) = chunk else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::TextDelta { text } if text == "Hel"));
    }

    #[test]
    fn test_finish_chunk_and_usage() {
        let chunk = parse_stream_data(
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":5,"completion_tokens":7}}"#,
        )
        .unwrap();
        let StreamChunk::Events(events) = chunk else {
            panic!("expected events");
        };
        assert!(matches!(
            events[0],
            StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn }
        ));
        assert!(matches!(&events[1], StreamEvent::Usage(u) if u.output_tokens == 7));
    }

    #[test]
    fn test_empty_delta_yields_nothing() {
        let chunk = parse_stream_data(r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#)
            .unwrap();
        assert_eq!(chunk, StreamChunk::Events(Vec::new()));
    }

    #[test]
    fn test_error_chunk_and_garbage() {
        assert!(matches!(
            parse_stream_data(r#"{"error":{"message":"quota exceeded"}}"#),
            Err(LlmError::Provider { message }) if message == "API error: quota exceeded"
        ));
        assert!(matches!(
            parse_stream_data("{oops"),
            Err(LlmError::Deserialization(_))
        ));
    }
}
