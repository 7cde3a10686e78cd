//! Wire data models for both sides of the gateway.
//!
//! This module contains the type definitions for request/response bodies used by:
//! - The inbound OpenAI-compatible API (`openai`)
//! - The upstream Anthropic Messages API (`anthropic`)
//! - Polymorphic message content shared by both (`content`)
//! - Streaming event and frame types (`streaming`)

pub mod anthropic;
pub mod content;
pub mod openai;
pub mod streaming;

pub use content::{extract_text, ContentPart, MessageContent};
pub use openai::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolCall};
pub use streaming::{SseEvent, StreamFrame};

/// Read an explicit `null` the same way as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
