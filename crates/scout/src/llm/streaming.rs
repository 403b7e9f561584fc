//! Server-Sent Events parsing for streaming chat completions

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;

use super::ChunkStream;
use super::types::CompletionChunk;
use crate::error::ScoutError;

/// A parsed `data:` line from a provider stream
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// A completion chunk
    Chunk(CompletionChunk),
    /// The `[DONE]` marker
    Done,
    /// The provider reported an error, or the payload could not be parsed
    Error(String),
}

/// Parse one SSE line. Blank lines, comments and non-`data` fields yield `None`.
pub fn parse_sse_line(line: &str) -> Option<SseLine> {
    let line = line.trim();

    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();

    if data == "[DONE]" {
        return Some(SseLine::Done);
    }

    let value: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(SseLine::Error(format!("Failed to parse chunk: {e}"))),
    };

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Some(SseLine::Error(message));
    }

    match serde_json::from_value::<CompletionChunk>(value) {
        Ok(chunk) => Some(SseLine::Chunk(chunk)),
        Err(e) => Some(SseLine::Error(format!("Failed to parse chunk: {e}"))),
    }
}

/// Turn a raw SSE byte stream into completion chunks.
///
/// Lines and multi-byte characters may be split across network reads, so
/// raw bytes are buffered and only complete lines are decoded. The stream
/// ends at `[DONE]`, at the end of input, or right after the first error
/// item. A trailing partial line that does not parse is reported as an
/// error rather than dropped.
pub fn sse_chunks<S, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut finished = false;

        'read: while let Some(chunk_result) = bytes.next().await {
            match chunk_result {
                Ok(data) => {
                    buffer.extend_from_slice(&data);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let raw: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        match decode_line(&raw) {
                            Some(SseLine::Chunk(chunk)) => yield Ok(chunk),
                            Some(SseLine::Done) => {
                                finished = true;
                                break 'read;
                            }
                            Some(SseLine::Error(message)) => {
                                finished = true;
                                yield Err(ScoutError::Stream(message));
                                break 'read;
                            }
                            None => {}
                        }
                    }
                }
                Err(e) => {
                    finished = true;
                    yield Err(ScoutError::Stream(e.to_string()));
                    break 'read;
                }
            }
        }

        if !finished {
            match decode_line(&buffer) {
                Some(SseLine::Chunk(chunk)) => yield Ok(chunk),
                Some(SseLine::Error(message)) => {
                    yield Err(ScoutError::Stream(format!("Truncated stream: {message}")));
                }
                Some(SseLine::Done) | None => {}
            }
        }
    };

    stream.boxed()
}

/// Decode one complete line. Invalid UTF-8 is an error item.
fn decode_line(raw: &[u8]) -> Option<SseLine> {
    match std::str::from_utf8(raw) {
        Ok(line) => parse_sse_line(line),
        Err(e) => Some(SseLine::Error(format!("Invalid UTF-8 in stream: {e}"))),
    }
}
