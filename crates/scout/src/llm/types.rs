//! Wire types for OpenAI-compatible chat completions

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// Non-streaming chat completion response
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice. `None` when there are no choices; a null
    /// content field counts as empty text.
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
    }
}

/// One chunk of a streaming completion
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// A chunk carrying a single text delta
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: Some(text.into()),
                },
            }],
        }
    }

    /// The text delta of the first choice, if present and non-empty
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()?
            .delta
            .content
            .as_deref()
            .filter(|s| !s.is_empty())
    }
}
