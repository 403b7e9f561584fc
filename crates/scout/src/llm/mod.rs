//! Chat completion provider abstraction
//!
//! The orchestrator talks to the LLM through [`CompletionProvider`], which
//! has one call per delivery mode: a single completion, or a stream of
//! incremental chunks.

mod openai;
pub mod streaming;
pub mod types;

pub use openai::OpenAiClient;
pub use types::{CompletionChunk, CompletionRequest};

use async_trait::async_trait;
use futures::stream::BoxStream;
use url::Url;

use crate::error::{Result, ScoutError};

/// Incremental chunks from a streaming completion. An `Err` item means the
/// stream broke and no further items should be expected.
pub type ChunkStream = BoxStream<'static, Result<CompletionChunk>>;

/// Trait for chat completion backends
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a completion and return the full assistant text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Start a streaming completion
    ///
    /// Errors returned here happen before any chunk is produced (connect
    /// failure, auth, non-2xx status). Failures after that arrive as stream
    /// items.
    async fn complete_streaming(&self, request: &CompletionRequest) -> Result<ChunkStream>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Build `<base>/chat/completions` from an API base URL
pub fn chat_completions_url(base: &str) -> Result<Url> {
    let joined = format!("{}/chat/completions", base.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| ScoutError::Config(format!("Invalid API URL '{base}': {e}")))
}
