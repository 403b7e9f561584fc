//! Chat completion orchestration
//!
//! Normalizes the inbound messages, runs the optional web search, builds
//! the final prompt and picks the response path.

use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Arc;
use tracing::{debug, info};

use super::injection::{extract_user_query, inject_search_results};
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::error::Result;
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::proxy::{StreamEvent, relay};
use crate::search::SearchAugmenter;

/// Events for one streamed reply
pub type EventStream = BoxStream<'static, StreamEvent>;

/// Outcome of a chat request
pub enum ChatReply {
    /// Single JSON response
    Complete(ChatResponse),
    /// Incremental events, ending with [`StreamEvent::Done`]
    Stream(EventStream),
}

impl std::fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatReply::Complete(response) => f.debug_tuple("Complete").field(response).finish(),
            ChatReply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Orchestrates the search provider and the completion provider
#[derive(Clone)]
pub struct ChatService {
    llm: Arc<dyn CompletionProvider>,
    search: Arc<dyn SearchAugmenter>,
}

impl ChatService {
    pub fn new(llm: Arc<dyn CompletionProvider>, search: Arc<dyn SearchAugmenter>) -> Self {
        Self { llm, search }
    }

    /// Handle one chat request.
    ///
    /// Search failures never fail the request; only an LLM provider error
    /// is returned as `Err`.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply> {
        request.validate()?;

        let ChatRequest {
            messages,
            model,
            temperature,
            max_tokens,
            stream,
            web_search,
        } = request;

        let mut messages: Vec<ChatMessage> = messages.into_iter().map(ChatMessage::from).collect();

        let search_results = match extract_user_query(&messages) {
            Some(query) if web_search => {
                info!("Web search enabled for query: {query}");
                let results = self.search.augment(query).await;
                debug!(
                    provider = self.search.name(),
                    "Search results obtained ({} chars)",
                    results.len()
                );
                Some(results)
            }
            _ => None,
        };

        if let Some(results) = &search_results {
            inject_search_results(&mut messages, results);
        }

        debug!(
            "Sending {} messages to {}",
            messages.len(),
            self.llm.name()
        );

        let completion = CompletionRequest {
            model,
            messages,
            temperature,
            max_tokens,
            stream,
        };

        if stream {
            debug!("Streaming mode enabled");
            let chunks = self.llm.complete_streaming(&completion).await?;
            let search_init = search_results.filter(|s| web_search && !s.is_empty());
            return Ok(ChatReply::Stream(relay(chunks, search_init).boxed()));
        }

        let text = self.llm.complete(&completion).await?;
        debug!("Response generated: {} characters", text.len());

        let mut response = ChatResponse::from_text(text);
        if web_search {
            response = response.with_search_results(search_results.unwrap_or_default());
        }

        Ok(ChatReply::Complete(response))
    }
}
