//! Anthropic Messages API type definitions.
//!
//! This module defines the request and response structures for the [Anthropic Messages API](https://docs.anthropic.com/en/api/messages).
//! Requests are produced by the translator; responses are decoded from the upstream provider.

use super::content::MessageContent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anthropic Messages API request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// The backend model that will complete the prompt.
    pub model: String,

    /// Input messages. Roles strictly alternate.
    pub messages: Vec<Message>,

    /// System prompt.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,

    /// The maximum number of tokens to generate before stopping.
    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Custom text sequences that will cause the model to stop generating.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,

    #[serde(default)]
    pub stream: bool,

    /// Definitions of tools that the model may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// "user" or "assistant".
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// Content block types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// Extended thinking block
    Thinking {
        #[serde(default)]
        thinking: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    /// A tool use request from the model.
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    /// Result of a tool execution, keyed by the originating tool use id.
    ToolResult {
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<MessageContent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Block types this gateway does not interpret (images, redacted thinking, ...).
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// Tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value, // JSON Schema
}

/// How the model should use the provided tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    Auto,
    Any,
    Tool { name: String },
}

/// Anthropic Messages API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Unique object identifier.
    #[serde(default)]
    pub id: String,

    /// Object type (always "message").
    #[serde(rename = "type", default)]
    pub response_type: String,

    #[serde(default)]
    pub role: String,

    /// Content generated by the model.
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    #[serde(default)]
    pub model: String,

    /// The reason why the model stopped generating.
    #[serde(default)]
    pub stop_reason: Option<String>,

    /// Billing and rate-limit usage.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_choice_serialization() {
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), json!({"type": "auto"}));
        assert_eq!(serde_json::to_value(ToolChoice::Any).unwrap(), json!({"type": "any"}));
        assert_eq!(
            serde_json::to_value(ToolChoice::Tool { name: "f".into() }).unwrap(),
            json!({"type": "tool", "name": "f"})
        );
    }

    #[test]
    fn test_response_with_unknown_block() {
        let resp: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "redacted_thinking", "data": "xyz"},
                {"type": "text", "text": "hello"}
            ],
            "model": "claude-x",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 3, "output_tokens": 4}
        }))
        .unwrap();
        assert_eq!(resp.content[0], ContentBlock::Unknown);
        assert_eq!(resp.content[1], ContentBlock::text("hello"));
        assert_eq!(resp.usage.unwrap().output_tokens, 4);
    }

    #[test]
    fn test_tool_result_keeps_raw_content() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".into(),
            content: Some(MessageContent::Text("42".into())),
            is_error: None,
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "42"})
        );
    }

    #[test]
    fn test_request_omits_empty_fields() {
        let req = MessagesRequest {
            model: "claude-x".into(),
            messages: vec![],
            system: String::new(),
            max_tokens: 8192,
            temperature: None,
            top_p: None,
            stop_sequences: vec![],
            stream: false,
            tools: vec![],
            tool_choice: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("system").is_none());
        assert!(v.get("tools").is_none());
        assert_eq!(v["max_tokens"], 8192);
    }
}
