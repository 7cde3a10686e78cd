// Request translation (OpenAI → Anthropic)

use crate::error::Result;
use crate::models::anthropic::{ContentBlock, Message, MessagesRequest};
use crate::models::content::extract_text;
use crate::models::openai::{ChatCompletionRequest, ChatMessage};
use crate::translation::tools::{
    parse_tool_arguments, translate_tool_choice, translate_tools, ToolChoiceEffect,
};
use serde_json::Value;
use tracing::debug;

/// Smallest `max_tokens` ever sent upstream.
pub const MIN_MAX_TOKENS: u32 = 8192;

/// Translate a Chat Completions request into a Messages request for `backend_model`.
pub fn translate_request(
    req: &ChatCompletionRequest,
    backend_model: &str,
) -> Result<MessagesRequest> {
    debug!(
        "Translating request for model: {} -> {}",
        req.model, backend_model
    );

    // 1. Tools and tool choice (choice only matters when tools exist)
    let mut tools = translate_tools(&req.tools);
    let mut tool_choice = None;
    if let (Some(choice), false) = (&req.tool_choice, tools.is_empty()) {
        match translate_tool_choice(choice) {
            ToolChoiceEffect::Keep(choice) => tool_choice = choice,
            ToolChoiceEffect::DropTools => tools.clear(),
        }
    }

    // 2. Messages and system prompt
    let (system, messages) = translate_messages(&req.messages)?;

    debug!(
        "Translated request: {} messages, system: {} chars, tools: {}",
        messages.len(),
        system.len(),
        tools.len()
    );

    Ok(MessagesRequest {
        model: backend_model.to_string(),
        messages,
        system,
        max_tokens: max_tokens_floor(req.max_tokens),
        temperature: req.temperature,
        top_p: req.top_p,
        stop_sequences: req.stop.as_ref().map(stop_sequences).unwrap_or_default(),
        stream: req.stream,
        tools,
        tool_choice,
    })
}

/// Client `max_tokens` if positive, never below [`MIN_MAX_TOKENS`].
pub fn max_tokens_floor(requested: Option<i64>) -> u32 {
    let requested = requested
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0);
    requested.max(MIN_MAX_TOKENS)
}

fn stop_sequences(stop: &Value) -> Vec<String> {
    match stop {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Translate the message list, returning the concatenated system prompt and
/// strictly alternating backend messages.
fn translate_messages(messages: &[ChatMessage]) -> Result<(String, Vec<Message>)> {
    let mut system = String::new();
    let mut out: Vec<Message> = Vec::new();

    for msg in messages {
        if msg.role == "system" {
            system.push_str(&extract_text(msg.content.as_ref()));
            continue;
        }

        let (role, mut blocks) = translate_message(msg)?;

        // The backend rejects empty content arrays
        if blocks.is_empty() {
            blocks.push(ContentBlock::text(" "));
        }

        // ...and consecutive messages with the same role
        match out.last_mut() {
            Some(prev) if prev.role == role => prev.content.extend(blocks),
            _ => out.push(Message {
                role: role.to_string(),
                content: blocks,
            }),
        }
    }

    Ok((system, out))
}

fn translate_message(msg: &ChatMessage) -> Result<(&str, Vec<ContentBlock>)> {
    if msg.role == "tool" {
        // Tool output goes back as a user turn keyed by the original call id
        let block = ContentBlock::ToolResult {
            tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
            content: msg.content.clone(),
            is_error: None,
        };
        return Ok(("user", vec![block]));
    }

    let mut blocks = Vec::new();
    let text = extract_text(msg.content.as_ref());
    if !text.is_empty() {
        blocks.push(ContentBlock::Text { text });
    }

    if msg.role == "assistant" {
        for call in &msg.tool_calls {
            debug!("Translating tool call: {} ({})", call.function.name, call.id);
            blocks.push(ContentBlock::ToolUse {
                id: call.id.clone(),
                name: call.function.name.clone(),
                input: parse_tool_arguments(&call.id, &call.function.arguments)?,
            });
        }
    }

    Ok((msg.role.as_str(), blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;
    use crate::models::anthropic::ToolChoice;
    use crate::models::content::{ContentPart, MessageContent};
    use crate::models::openai::ToolCall;
    use serde_json::json;

    fn request(messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o".into(),
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stream: false,
            tools: vec![],
            tool_choice: None,
            stop: None,
        }
    }

    fn assistant_with_calls(text: &str, calls: Vec<ToolCall>) -> ChatMessage {
        let mut msg = ChatMessage::new("assistant", text);
        msg.tool_calls = calls;
        msg
    }

    fn tool_message(call_id: &str, content: &str) -> ChatMessage {
        let mut msg = ChatMessage::new("tool", content);
        msg.tool_call_id = Some(call_id.into());
        msg
    }

    #[test]
    fn test_simple_message_translation() {
        let out = translate_request(&request(vec![ChatMessage::new("user", "Hello")]), "claude-x")
            .unwrap();

        assert_eq!(out.model, "claude-x");
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.messages[0].role, "user");
        assert_eq!(out.messages[0].content, vec![ContentBlock::text("Hello")]);
    }

    #[test]
    fn test_max_tokens_floor() {
        assert_eq!(max_tokens_floor(None), 8192);
        assert_eq!(max_tokens_floor(Some(0)), 8192);
        assert_eq!(max_tokens_floor(Some(-5)), 8192);
        assert_eq!(max_tokens_floor(Some(100)), 8192);
        assert_eq!(max_tokens_floor(Some(20000)), 20000);
        assert_eq!(max_tokens_floor(Some(i64::MAX)), u32::MAX);
    }

    #[test]
    fn test_system_messages_concatenate() {
        let out = translate_request(
            &request(vec![
                ChatMessage::new("system", "You are helpful. "),
                ChatMessage::new("user", "hi"),
                ChatMessage::new("system", "Be brief."),
            ]),
            "claude-x",
        )
        .unwrap();

        assert_eq!(out.system, "You are helpful. Be brief.");
        assert_eq!(out.messages.len(), 1);
    }

    #[test]
    fn test_tool_round_trip_preserves_ids() {
        let out = translate_request(
            &request(vec![
                ChatMessage::new("user", "weather?"),
                assistant_with_calls(
                    "",
                    vec![ToolCall::function(0, "call_abc", "get_weather", r#"{"city":"Paris"}"#)],
                ),
                tool_message("call_abc", "sunny"),
            ]),
            "claude-x",
        )
        .unwrap();

        assert_eq!(out.messages.len(), 3);
        assert_eq!(
            out.messages[1].content,
            vec![ContentBlock::ToolUse {
                id: "call_abc".into(),
                name: "get_weather".into(),
                input: json!({"city": "Paris"}),
            }]
        );
        assert_eq!(out.messages[2].role, "user");
        assert_eq!(
            out.messages[2].content,
            vec![ContentBlock::ToolResult {
                tool_use_id: "call_abc".into(),
                content: Some(MessageContent::Text("sunny".into())),
                is_error: None,
            }]
        );
    }

    #[test]
    fn test_assistant_text_precedes_tool_use() {
        let out = translate_request(
            &request(vec![assistant_with_calls(
                "Let me check.",
                vec![ToolCall::function(0, "c1", "f", "{}")],
            )]),
            "claude-x",
        )
        .unwrap();

        let blocks = &out.messages[0].content;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], ContentBlock::text("Let me check."));
        assert!(matches!(blocks[1], ContentBlock::ToolUse { .. }));
    }

    #[test]
    fn test_adjacent_same_role_messages_merge() {
        let out = translate_request(
            &request(vec![
                ChatMessage::new("user", "one"),
                ChatMessage::new("user", "two"),
                ChatMessage::new("user", "three"),
            ]),
            "claude-x",
        )
        .unwrap();

        assert_eq!(out.messages.len(), 1);
        assert_eq!(
            out.messages[0].content,
            vec![
                ContentBlock::text("one"),
                ContentBlock::text("two"),
                ContentBlock::text("three"),
            ]
        );
    }

    #[test]
    fn test_parallel_tool_results_merge_into_one_user_turn() {
        let out = translate_request(
            &request(vec![
                assistant_with_calls(
                    "",
                    vec![
                        ToolCall::function(0, "c1", "f", "{}"),
                        ToolCall::function(1, "c2", "g", "{}"),
                    ],
                ),
                tool_message("c1", "r1"),
                tool_message("c2", "r2"),
                ChatMessage::new("user", "thanks"),
            ]),
            "claude-x",
        )
        .unwrap();

        assert_eq!(out.messages.len(), 2);
        assert_eq!(out.messages[1].role, "user");
        assert_eq!(out.messages[1].content.len(), 3);
    }

    #[test]
    fn test_empty_content_becomes_single_space() {
        let out = translate_request(&request(vec![ChatMessage::new("user", "")]), "claude-x")
            .unwrap();
        assert_eq!(out.messages[0].content, vec![ContentBlock::text(" ")]);
    }

    #[test]
    fn test_multipart_user_content_extracts_text() {
        let content = MessageContent::Parts(vec![
            ContentPart::text("look at "),
            ContentPart {
                part_type: "image_url".into(),
                text: None,
                extra: serde_json::Map::new(),
            },
            ContentPart::text("this"),
        ]);
        let mut msg = ChatMessage::new("user", "");
        msg.content = Some(content);

        let out = translate_request(&request(vec![msg]), "claude-x").unwrap();
        assert_eq!(out.messages[0].content, vec![ContentBlock::text("look at this")]);
    }

    #[test]
    fn test_tool_choice_none_drops_tools() {
        let mut req: ChatCompletionRequest = serde_json::from_value(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi"}],
            "tools": [{"type": "function", "function": {"name": "f", "parameters": {"type": "object"}}}],
            "tool_choice": "none"
        }))
        .unwrap();

        let out = translate_request(&req, "claude-x").unwrap();
        assert!(out.tools.is_empty());
        assert!(out.tool_choice.is_none());

        req.tool_choice = Some(json!("required"));
        let out = translate_request(&req, "claude-x").unwrap();
        assert_eq!(out.tools.len(), 1);
        assert_eq!(out.tool_choice, Some(ToolChoice::Any));
    }

    #[test]
    fn test_tool_choice_ignored_without_tools() {
        let mut req = request(vec![ChatMessage::new("user", "hi")]);
        req.tool_choice = Some(json!("required"));

        let out = translate_request(&req, "claude-x").unwrap();
        assert!(out.tool_choice.is_none());
    }

    #[test]
    fn test_stop_sequences() {
        let mut req = request(vec![ChatMessage::new("user", "hi")]);
        req.stop = Some(json!("END"));
        assert_eq!(translate_request(&req, "m").unwrap().stop_sequences, vec!["END"]);

        req.stop = Some(json!(["a", "b"]));
        assert_eq!(translate_request(&req, "m").unwrap().stop_sequences, vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_tool_arguments_rejected() {
        let req = request(vec![assistant_with_calls(
            "",
            vec![ToolCall::function(0, "c1", "f", "{oops")],
        )]);
        assert!(matches!(
            translate_request(&req, "claude-x"),
            Err(ProxyError::InvalidRequest(_))
        ));
    }
}
