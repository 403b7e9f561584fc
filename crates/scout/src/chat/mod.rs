//! Chat request handling
//!
//! Wire types, content normalization, search context injection and the
//! service that ties the providers together.

mod injection;
mod normalize;
mod service;
mod types;

pub use injection::{extract_user_query, inject_search_results};
pub use normalize::normalize_content;
pub use service::{ChatReply, ChatService, EventStream};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, ContentBlock, InboundMessage, MessageContent, Role,
    TextContent,
};
