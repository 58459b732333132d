//! Block parsing and payload interpretation.
//!
//! A block's `data:` lines are joined with `\n` and trimmed. The result is
//! the `[DONE]` sentinel, a structured JSON object with a `type` field, or
//! anything else, which is passed through as opaque text.

use crate::events::StreamEvent;
use chatstream_core::Correlation;
use serde_json::{Map, Value as JsonValue};
use tracing::trace;

/// Literal completion sentinel.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_FIELD: &str = "data:";

/// Join the `data:` lines of a block.
///
/// One space after the colon is stripped. Lines with any other prefix
/// (`event:`, `id:`, comments) are ignored. Returns `None` when the block
/// has no data lines at all.
#[must_use]
pub fn extract_data(block: &str) -> Option<String> {
    let mut data: Option<String> = None;

    for line in block.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some(value) = line.strip_prefix(DATA_FIELD) else {
            continue;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);

        match data.as_mut() {
            Some(joined) => {
                joined.push('\n');
                joined.push_str(value);
            }
            None => data = Some(value.to_string()),
        }
    }

    data
}

/// Turn joined data-line text into an event.
///
/// Returns `None` for payloads that are empty after trimming.
#[must_use]
pub fn interpret(data: &str) -> Option<StreamEvent> {
    let text = data.trim();
    if text.is_empty() {
        return None;
    }
    if text == DONE_SENTINEL {
        return Some(StreamEvent::SentinelDone);
    }

    let event = match serde_json::from_str::<JsonValue>(text) {
        Ok(JsonValue::Object(fields)) => interpret_object(fields, text),
        Ok(_) => StreamEvent::opaque(text),
        Err(error) => {
            trace!(%error, "payload is not JSON, passing through");
            StreamEvent::opaque(text)
        }
    };
    Some(event)
}

/// Parse one block into at most one event.
#[must_use]
pub fn parse_block(block: &str) -> Option<StreamEvent> {
    extract_data(block).and_then(|data| interpret(&data))
}

fn interpret_object(mut fields: Map<String, JsonValue>, raw: &str) -> StreamEvent {
    let kind = fields
        .get("type")
        .and_then(JsonValue::as_str)
        .map(str::to_owned);

    match kind.as_deref() {
        Some("delta") => match fields.remove("text") {
            Some(JsonValue::String(text)) => StreamEvent::Delta { text },
            _ => StreamEvent::opaque(raw),
        },
        Some("thinking" | "reasoning") => match fields.remove("text") {
            Some(JsonValue::String(text)) => StreamEvent::Thinking { text },
            _ => StreamEvent::opaque(raw),
        },
        Some("done") => StreamEvent::Done {
            correlation: Correlation::from_fields(fields),
        },
        _ => {
            trace!(kind = ?kind, "unrecognized payload shape, passing through");
            StreamEvent::opaque(raw)
        }
    }
}
