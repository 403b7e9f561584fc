//! Flattening of inbound message content to a single string

use super::types::{ChatMessage, InboundMessage, MessageContent};

/// Collapse message content to one string.
///
/// Strings pass through untouched. For block lists, the `text` of every
/// `"text"` block is joined with a single space. A block list with no text
/// blocks is rendered back as JSON so the message is never dropped.
pub fn normalize_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => {
            let texts: Vec<&str> = blocks
                .iter()
                .filter(|b| b.kind.as_deref() == Some("text"))
                .filter_map(|b| b.text.as_deref())
                .collect();

            if texts.is_empty() {
                serde_json::to_string(blocks).unwrap_or_default()
            } else {
                texts.join(" ")
            }
        }
    }
}

impl From<InboundMessage> for ChatMessage {
    fn from(message: InboundMessage) -> Self {
        let content = match message.content {
            MessageContent::Text(text) => text,
            blocks => normalize_content(&blocks),
        };
        ChatMessage::new(message.role, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::{ContentBlock, Role};
    use serde_json::{Map, json};

    fn block(kind: &str, text: Option<&str>) -> ContentBlock {
        ContentBlock {
            kind: Some(kind.to_string()),
            text: text.map(str::to_string),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_string_passes_through() {
        let content = MessageContent::Text("What is the capital of France?".to_string());
        assert_eq!(normalize_content(&content), "What is the capital of France?");
    }

    #[test]
    fn test_string_is_idempotent() {
        let content = MessageContent::Text("  spaced  out  ".to_string());
        let once = normalize_content(&content);
        let twice = normalize_content(&MessageContent::Text(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_blocks_joined_with_space() {
        let content = MessageContent::Blocks(vec![
            ContentBlock::text("Hello"),
            block("image", None),
            ContentBlock::text("world"),
        ]);
        assert_eq!(normalize_content(&content), "Hello world");
    }

    #[test]
    fn test_text_block_without_text_is_skipped() {
        let content = MessageContent::Blocks(vec![block("text", None), ContentBlock::text("kept")]);
        assert_eq!(normalize_content(&content), "kept");
    }

    #[test]
    fn test_no_text_blocks_falls_back_to_rendering() {
        let mut image = block("image", None);
        image.extra.insert("url".to_string(), json!("cat.png"));
        let content = MessageContent::Blocks(vec![image]);

        let rendered = normalize_content(&content);
        assert!(rendered.contains("image"));
        assert!(rendered.contains("cat.png"));
    }

    #[test]
    fn test_empty_block_list_falls_back_to_rendering() {
        let content = MessageContent::Blocks(Vec::new());
        assert_eq!(normalize_content(&content), "[]");
    }

    #[test]
    fn test_inbound_message_conversion() {
        let inbound = InboundMessage {
            role: Role::User,
            content: MessageContent::Blocks(vec![ContentBlock::text("a"), ContentBlock::text("b")]),
        };
        let message = ChatMessage::from(inbound);
        assert_eq!(message, ChatMessage::user("a b"));
    }
}
