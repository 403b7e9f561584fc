//! Search context injection for chat requests
//!
//! Locates the query to search for and prepends the search results to the
//! prompt as a system message.

use super::types::{ChatMessage, Role};
use crate::search::prompts::search_context_prompt;

/// Content of the last user message, which is the query to search for.
///
/// Returns `None` when there is no user message or the last one is empty.
pub fn extract_user_query(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .filter(|content| !content.is_empty())
}

/// Prepend one system message carrying the search results and citation
/// instructions. Existing system messages are left where they are.
pub fn inject_search_results(messages: &mut Vec<ChatMessage>, search_results: &str) {
    messages.insert(0, ChatMessage::system(search_context_prompt(search_results)));
}
