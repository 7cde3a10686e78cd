// Streaming event types: Anthropic SSE payloads in, OpenAI chunk frames out

use super::anthropic::Usage;
use super::openai::ChatCompletionResponse;
use serde::{Deserialize, Serialize};

/// Terminal sentinel of an OpenAI chunk stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One raw upstream server-sent event: event type plus its JSON `data` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// `content_block_start` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlockStartEvent {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub content_block: Option<ContentBlockStart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockStart {
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
    },
    #[serde(other)]
    Other,
}

/// `content_block_delta` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlockDeltaEvent {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub delta: Option<Delta>,
}

/// Delta types for content_block_delta events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta {
        #[serde(default)]
        text: String,
    },
    ThinkingDelta {
        #[serde(default)]
        thinking: String,
    },
    InputJsonDelta {
        #[serde(default)]
        partial_json: String,
    },
    /// signature_delta and anything newer
    #[serde(other)]
    Other,
}

/// `message_delta` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageDeltaEvent {
    #[serde(default)]
    pub delta: MessageDeltaData,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageDeltaData {
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// A frame written to the client's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Chunk(ChatCompletionResponse),
    Done,
}

impl StreamFrame {
    /// Format as a Server-Sent Event `data:` frame
    pub fn to_sse(&self) -> String {
        match self {
            StreamFrame::Chunk(chunk) => {
                let data = serde_json::to_string(chunk).unwrap_or_else(|_| "{}".to_string());
                format!("data: {}\n\n", data)
            }
            StreamFrame::Done => format!("data: {}\n\n", DONE_SENTINEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_frame_format() {
        assert_eq!(StreamFrame::Done.to_sse(), "data: [DONE]\n\n");
    }

    #[test]
    fn test_unknown_delta_type() {
        let ev: ContentBlockDeltaEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"signature_delta","signature":"abc"}}"#,
        )
        .unwrap();
        assert_eq!(ev.delta, Some(Delta::Other));
    }

    #[test]
    fn test_tool_use_block_start() {
        let ev: ContentBlockStartEvent = serde_json::from_str(
            r#"{"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"t1","name":"f","input":{}}}"#,
        )
        .unwrap();
        assert_eq!(
            ev.content_block,
            Some(ContentBlockStart::ToolUse { id: "t1".into(), name: "f".into() })
        );
    }
}
