//! Test utilities for scout - in-memory providers
//!
//! Mocks for the completion and search seams, so the chat service and the
//! router can be exercised without any network access.

use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, ScoutError};
use crate::llm::{ChunkStream, CompletionChunk, CompletionProvider, CompletionRequest};
use crate::search::{SearchAugmenter, SearchResult};

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Chunks {
        parts: Vec<String>,
        error: Option<String>,
    },
    Fail(String),
}

/// Completion provider with a scripted reply that records every request
#[derive(Debug)]
pub struct MockCompletionProvider {
    reply: MockReply,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    fn new(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `text`. Streaming yields it as one chunk.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    /// Stream each part as its own chunk. Non-streaming joins them.
    pub fn with_chunks<S: Into<String>>(parts: Vec<S>) -> Self {
        Self::new(MockReply::Chunks {
            parts: parts.into_iter().map(Into::into).collect(),
            error: None,
        })
    }

    /// Stream the parts, then fail mid-stream with `error`
    pub fn with_chunks_then_error<S: Into<String>>(parts: Vec<S>, error: impl Into<String>) -> Self {
        Self::new(MockReply::Chunks {
            parts: parts.into_iter().map(Into::into).collect(),
            error: Some(error.into()),
        })
    }

    /// Fail every call with a provider error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockReply::Fail(message.into()))
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.recorded().clone()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.recorded().push(request.clone());

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Chunks { parts, .. } => Ok(parts.concat()),
            MockReply::Fail(message) => Err(ScoutError::Provider(message.clone())),
        }
    }

    async fn complete_streaming(&self, request: &CompletionRequest) -> Result<ChunkStream> {
        self.recorded().push(request.clone());

        let (parts, error) = match &self.reply {
            MockReply::Text(text) => (vec![text.clone()], None),
            MockReply::Chunks { parts, error } => (parts.clone(), error.clone()),
            MockReply::Fail(message) => return Err(ScoutError::Provider(message.clone())),
        };

        let mut items: Vec<Result<CompletionChunk>> = parts
            .into_iter()
            .map(|p| Ok(CompletionChunk::from_text(p)))
            .collect();
        if let Some(message) = error {
            items.push(Err(ScoutError::Stream(message)));
        }

        Ok(stream::iter(items).boxed())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Search augmenter returning a fixed result and recording queries
#[derive(Debug)]
pub struct MockSearch {
    result: SearchResult,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new(result: impl Into<SearchResult>) -> Self {
        Self {
            result: result.into(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far, oldest first
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SearchAugmenter for MockSearch {
    async fn augment(&self, query: &str) -> SearchResult {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.to_string());
        self.result.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
