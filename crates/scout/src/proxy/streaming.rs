//! Streaming relay from provider chunks to client frames
//!
//! Each client frame carries the full text generated so far, not just the
//! latest delta, so a client can simply replace what it renders.

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use tracing::{debug, error};

use crate::chat::EventStream;
use crate::error::ScoutError;
use crate::llm::ChunkStream;

/// One event sent to a streaming client
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Search results, sent before any generated text
    SearchInit { search_results: String },
    /// Accumulated text after a new delta
    Delta { full_text: String },
    /// The provider stream failed; no further deltas follow
    Error { message: String },
    /// Final event of every stream
    Done,
}

impl StreamEvent {
    /// Render as a Server-Sent Events `data:` frame
    pub fn to_frame(&self) -> String {
        let payload = match self {
            StreamEvent::SearchInit { search_results } => json!({
                "content": [{"type": "text", "text": ""}],
                "search_results": search_results,
            }),
            StreamEvent::Delta { full_text } => json!({
                "content": [{"type": "text", "text": full_text}],
            }),
            StreamEvent::Error { message } => json!({ "error": message }),
            StreamEvent::Done => return "data: [DONE]\n\n".to_string(),
        };

        format!("data: {payload}\n\n")
    }
}

/// Relay provider chunks as client events.
///
/// Emits `SearchInit` first when `search_results` is given, then one
/// `Delta` per chunk that carries text, and always ends with `Done`. The
/// first chunk error becomes an `Error` event and stops consumption.
pub fn relay(
    chunks: ChunkStream,
    search_results: Option<String>,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    async_stream::stream! {
        let mut chunks = chunks;

        if let Some(search_results) = search_results {
            yield StreamEvent::SearchInit { search_results };
        }

        let mut full_text = String::new();

        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => {
                    if let Some(delta) = chunk.delta_text() {
                        full_text.push_str(delta);
                        yield StreamEvent::Delta { full_text: full_text.clone() };
                    }
                }
                Err(e) => {
                    error!("Error in streaming: {e}");
                    let message = match e {
                        ScoutError::Stream(message) => message,
                        other => other.to_string(),
                    };
                    yield StreamEvent::Error { message };
                    break;
                }
            }
        }

        debug!("Stream finished ({} chars)", full_text.len());
        yield StreamEvent::Done;
    }
}

/// `text/event-stream` response over a stream of events
pub struct SseResponse {
    events: EventStream,
}

impl SseResponse {
    pub fn new(events: EventStream) -> Self {
        Self { events }
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let frames = self
            .events
            .map(|event| Ok::<_, Infallible>(Bytes::from(event.to_frame())));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(frames),
        )
            .into_response()
    }
}
