//! Web search augmentation
//!
//! The augmenter turns a user query into a markdown document (answer plus
//! sources) that gets embedded in the chat prompt. It never fails: missing
//! credentials, timeouts and provider errors all come back as an
//! `Error...` string in the same slot.

mod perplexity;
pub mod prompts;

pub use perplexity::{PerplexitySearch, SearchSource, format_search_answer};

use async_trait::async_trait;

/// Formatted search answer, or a formatted error string
pub type SearchResult = String;

/// Trait for web search backends
#[async_trait]
pub trait SearchAugmenter: Send + Sync {
    /// Search for `query` and return the formatted result
    async fn augment(&self, query: &str) -> SearchResult;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
