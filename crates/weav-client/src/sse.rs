// Server-sent event assembly for streamed agent replies
//
// The agent service streams `text/event-stream` bodies. Blocks are delimited by
// blank lines; each block is scanned line-by-line for the `data:`, `id:`,
// `event:` and `retry:` prefixes, with the literal prefix (including its
// trailing space) sliced off and the remainder trimmed. Lines matching no known
// prefix are ignored.
//
// `data` is the only required field. In the default lenient mode a block without
// it yields no event and is dropped without a report, so the assembled sequence
// can be shorter than the number of transmitted blocks. Strict mode surfaces the
// dropped block for diagnostics instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of a streamed agent reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Payload. May be the empty string; an empty payload is a valid event,
    /// distinct from "no event".
    pub data: String,
    /// Correlation identifier, when the service sends one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Event type tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Reconnect interval in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u64>,
}

/// How malformed stream content is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Drop blocks that fail validation and ignore malformed `retry:` lines.
    #[default]
    Lenient,
    /// Surface dropped blocks and malformed lines as errors.
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("invalid retry interval {value:?}")]
    InvalidRetry { value: String },

    #[error("event block carried no data field: {block:?}")]
    MissingData { block: String },
}

const DATA_PREFIX: &str = "data: ";
const ID_PREFIX: &str = "id: ";
const EVENT_PREFIX: &str = "event: ";
const RETRY_PREFIX: &str = "retry: ";

/// Slice the literal prefix (prefix word plus one space) off a field line.
/// A line shorter than the full prefix yields the empty remainder.
fn field_value(line: &str, prefix: &str) -> String {
    line.get(prefix.len()..).unwrap_or("").trim().to_string()
}

/// Assemble one event from a blank-line delimited block.
///
/// Returns `Ok(None)` when the block yields no event (lenient mode). Repeated
/// fields keep the last occurrence.
pub fn parse_block(block: &str, mode: ParseMode) -> Result<Option<AgentEvent>, EventError> {
    let mut data: Option<String> = None;
    let mut id: Option<String> = None;
    let mut event: Option<String> = None;
    let mut retry: Option<u64> = None;

    for line in block.lines() {
        if line.starts_with("data:") {
            data = Some(field_value(line, DATA_PREFIX));
        } else if line.starts_with("id:") {
            id = Some(field_value(line, ID_PREFIX));
        } else if line.starts_with("event:") {
            event = Some(field_value(line, EVENT_PREFIX));
        } else if line.starts_with("retry:") {
            let value = field_value(line, RETRY_PREFIX);
            match value.parse::<u64>() {
                Ok(ms) => retry = Some(ms),
                // A malformed interval invalidates only this line.
                Err(_) if mode == ParseMode::Lenient => {}
                Err(_) => return Err(EventError::InvalidRetry { value }),
            }
        }
        // Anything else (comments, unknown fields) is ignored.
    }

    match data {
        Some(data) => Ok(Some(AgentEvent {
            data,
            id,
            event,
            retry,
        })),
        None if mode == ParseMode::Lenient => Ok(None),
        None => Err(EventError::MissingData {
            block: block.to_string(),
        }),
    }
}

/// Assemble every event in a complete `text/event-stream` body, in transmission
/// order. The result may be shorter than the number of blocks transmitted.
pub fn parse_body(body: &str, mode: ParseMode) -> Result<Vec<AgentEvent>, EventError> {
    let mut buffer = BlockBuffer::new();
    let mut events = Vec::new();
    for block in buffer.push(body).into_iter().chain(buffer.finish()) {
        if let Some(event) = parse_block(&block, mode)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Incremental accumulator that turns arbitrary stream chunks into completed
/// blocks. Raw bytes are buffered and only decoded once a block's blank-line
/// separator has arrived, so both a separator and a multibyte character split
/// across transport chunks are handled naturally.
#[derive(Debug, Default)]
pub struct BlockBuffer {
    buf: Vec<u8>,
}

impl BlockBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded chunk and drain every block completed by it.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.push_bytes(chunk.as_bytes())
    }

    /// Append a raw transport chunk and drain every block completed by it.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut blocks = Vec::new();
        while let Some((at, sep_len)) = next_separator(&self.buf) {
            let block = String::from_utf8_lossy(&self.buf[..at]).into_owned();
            self.buf.drain(..at + sep_len);
            if !block.trim().is_empty() {
                blocks.push(block);
            }
        }
        blocks
    }

    /// Drain the trailing block of a body that ended without a final separator.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        let rest = String::from_utf8_lossy(&rest);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest.into_owned())
        }
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Position and length of the earliest blank-line separator, if one is complete.
fn next_separator(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = find_bytes(buf, b"\r\n\r\n").map(|at| (at, 4));
    let lf = find_bytes(buf, b"\n\n").map(|at| (at, 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (found, None) | (None, found) => found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(block: &str) -> Option<AgentEvent> {
        parse_block(block, ParseMode::Lenient).unwrap()
    }

    #[test]
    fn full_block_populates_every_field() {
        let event = lenient("data: hello\nid: 42\nevent: message\nretry: 1000").unwrap();
        assert_eq!(event.data, "hello");
        assert_eq!(event.id.as_deref(), Some("42"));
        assert_eq!(event.event.as_deref(), Some("message"));
        assert_eq!(event.retry, Some(1000));
    }

    #[test]
    fn block_without_data_yields_no_event() {
        assert_eq!(lenient("retry: 500"), None);
        assert_eq!(lenient("id: 7\nevent: ping"), None);
    }

    #[test]
    fn empty_payload_is_a_valid_event() {
        let event = lenient("data: ").unwrap();
        assert_eq!(event.data, "");
    }

    #[test]
    fn short_data_line_yields_empty_payload() {
        // "data:" with nothing after it slices to an empty remainder
        let event = lenient("data:").unwrap();
        assert_eq!(event.data, "");
    }

    #[test]
    fn unknown_lines_are_ignored() {
        let event = lenient(": keep-alive\nfoo: bar\ndata: payload").unwrap();
        assert_eq!(event.data, "payload");
        assert_eq!(event.event, None);
    }

    #[test]
    fn repeated_fields_keep_the_last_occurrence() {
        let event = lenient("data: first\ndata: second").unwrap();
        assert_eq!(event.data, "second");
    }

    #[test]
    fn malformed_retry_is_dropped_in_lenient_mode() {
        let event = lenient("data: x\nretry: soon").unwrap();
        assert_eq!(event.retry, None);
        assert_eq!(event.data, "x");
    }

    #[test]
    fn malformed_retry_fails_the_block_in_strict_mode() {
        let err = parse_block("data: x\nretry: soon", ParseMode::Strict).unwrap_err();
        assert_eq!(
            err,
            EventError::InvalidRetry {
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn strict_mode_surfaces_dropped_blocks() {
        let err = parse_block("retry: 500", ParseMode::Strict).unwrap_err();
        assert_eq!(
            err,
            EventError::MissingData {
                block: "retry: 500".to_string()
            }
        );
    }

    #[test]
    fn body_with_one_malformed_block_yields_one_event_in_order() {
        let body = "data: first\n\nretry: 500\n\ndata: last\n";
        let events = parse_body(body, ParseMode::Lenient).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "first");
        assert_eq!(events[1].data, "last");
    }

    #[test]
    fn crlf_framed_body_parses_like_lf() {
        let body = "data: a\r\nid: 1\r\n\r\ndata: b\r\n\r\n";
        let events = parse_body(body, ParseMode::Lenient).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id.as_deref(), Some("1"));
        assert_eq!(events[1].data, "b");
    }

    #[test]
    fn block_buffer_handles_separators_split_across_chunks() {
        let mut buffer = BlockBuffer::new();
        assert!(buffer.push("data: he").is_empty());
        assert!(buffer.push("llo\n").is_empty());
        let blocks = buffer.push("\ndata: again");
        assert_eq!(blocks, vec!["data: hello".to_string()]);
        assert_eq!(buffer.finish().as_deref(), Some("data: again"));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn block_buffer_keeps_multibyte_characters_split_across_chunks() {
        let body = "data: café\nid: 1\n\n".as_bytes();
        // split inside the two-byte é
        let (head, tail) = body.split_at(10);

        let mut buffer = BlockBuffer::new();
        assert!(buffer.push_bytes(head).is_empty());
        let blocks = buffer.push_bytes(tail);
        assert_eq!(blocks, vec!["data: café\nid: 1".to_string()]);

        let event = parse_block(&blocks[0], ParseMode::Lenient).unwrap().unwrap();
        assert_eq!(event.data, "café");
    }

    #[test]
    fn block_buffer_skips_runs_of_blank_lines() {
        let mut buffer = BlockBuffer::new();
        let blocks = buffer.push("data: a\n\n\n\ndata: b\n\n");
        assert_eq!(blocks, vec!["data: a".to_string(), "data: b".to_string()]);
        assert_eq!(buffer.finish(), None);
    }
}
