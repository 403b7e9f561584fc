//! Inbound request and outbound response shapes for the chat endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ScoutError};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message with its content flattened to a single string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One typed block of inbound content, e.g. `{"type": "text", "text": "hi"}`
///
/// Unknown fields are kept so the block can be rendered back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: Some(text.into()),
            extra: Map::new(),
        }
    }
}

/// Message content as clients send it: a plain string or a list of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A chat message as received, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl InboundMessage {
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<InboundMessage>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub web_search: bool,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

impl ChatRequest {
    /// Request with default sampling settings, no streaming and no web search
    pub fn new(messages: Vec<InboundMessage>) -> Self {
        Self {
            messages,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stream: false,
            web_search: false,
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_web_search(mut self, web_search: bool) -> Self {
        self.web_search = web_search;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(ScoutError::InvalidRequest(
                "messages must contain at least one message".to_string(),
            ));
        }
        Ok(())
    }
}

/// A `{"type": "text", "text": ...}` part of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Non-streaming response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Vec<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<String>,
}

impl ChatResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            search_results: None,
        }
    }

    pub fn with_search_results(mut self, search_results: impl Into<String>) -> Self {
        self.search_results = Some(search_results.into());
        self
    }

    /// Text of the first content part
    pub fn text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "Hello"}]
        }))
        .unwrap();

        assert_eq!(request.model, "gpt-4o");
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 2000);
        assert!(!request.stream);
        assert!(!request.web_search);
    }

    #[test]
    fn test_request_accepts_block_content() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [{
                "role": "user",
                "content": [{"type": "text", "text": "Hi"}, {"type": "image", "url": "x.png"}]
            }],
            "stream": true,
            "web_search": true
        }))
        .unwrap();

        match &request.messages[0].content {
            MessageContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 2);
                assert_eq!(blocks[0].text.as_deref(), Some("Hi"));
                assert_eq!(blocks[1].kind.as_deref(), Some("image"));
                assert_eq!(blocks[1].extra["url"], "x.png");
            }
            other => panic!("Expected blocks, got {other:?}"),
        }
        assert!(request.stream);
        assert!(request.web_search);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: std::result::Result<ChatRequest, _> = serde_json::from_value(json!({
            "messages": [{"role": "tool", "content": "x"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_messages() {
        let request = ChatRequest::new(Vec::new());
        assert!(matches!(
            request.validate(),
            Err(ScoutError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_response_omits_missing_search_results() {
        let value = serde_json::to_value(ChatResponse::from_text("Paris")).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "Paris"}]}));
    }

    #[test]
    fn test_response_includes_search_results() {
        let response = ChatResponse::from_text("Paris").with_search_results("# Results");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["search_results"], "# Results");
        assert_eq!(response.text(), "Paris");
    }
}
