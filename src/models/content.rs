//! Polymorphic message content.
//!
//! Both wire formats allow a message's `content` to be either a bare string or
//! an ordered list of typed parts. Anything else is kept verbatim as
//! [`MessageContent::Opaque`] so it can still be forwarded untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message `content` value.
///
/// Variant order matters: serde tries them top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Opaque(Value),
}

/// One typed part of a multi-part content list.
///
/// Only `type` and `text` are interpreted; every other field is carried along
/// so the part serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub part_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            part_type: "text".to_string(),
            text: Some(text.into()),
            extra: Map::new(),
        }
    }
}

impl MessageContent {
    /// Flatten to text: a plain string verbatim, the concatenated `text` parts
    /// of a part list, or the raw JSON of anything else.
    pub fn to_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter(|p| p.part_type == "text")
                .filter_map(|p| p.text.as_deref())
                .collect(),
            MessageContent::Opaque(raw) => raw.to_string(),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// ContentExtractor over an optional content field. Absent content is empty.
pub fn extract_text(content: Option<&MessageContent>) -> String {
    content.map(MessageContent::to_text).unwrap_or_default()
}
