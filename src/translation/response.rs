// Response translation (Anthropic → OpenAI)

use crate::models::anthropic::{ContentBlock, MessagesResponse, Usage};
use crate::models::openai::{ChatCompletionResponse, ChatUsage, Choice, ChoiceMessage, ToolCall};
use tracing::debug;

/// Translate a complete Messages response into a single-choice chat completion
/// reported under the client's `model` name.
pub fn translate_response(
    resp: MessagesResponse,
    model: &str,
    created: i64,
) -> ChatCompletionResponse {
    let mut message = ChoiceMessage {
        role: "assistant".to_string(),
        ..Default::default()
    };

    for block in resp.content {
        match block {
            ContentBlock::Text { text } => message.content.push_str(&text),
            ContentBlock::Thinking { thinking, .. } => {
                message.reasoning_content.push_str(&thinking)
            }
            ContentBlock::ToolUse { id, name, input } => {
                let index = message.tool_calls.len();
                let arguments = serde_json::to_string(&input).unwrap_or_else(|_| "{}".to_string());
                message
                    .tool_calls
                    .push(ToolCall::function(index, &id, &name, arguments));
            }
            ContentBlock::ToolResult { .. } | ContentBlock::Unknown => {}
        }
    }

    debug!(
        "Translated response: {} chars, {} tool calls, stop_reason: {:?}",
        message.content.len(),
        message.tool_calls.len(),
        resp.stop_reason
    );

    ChatCompletionResponse {
        id: format!("chatcmpl-{}", resp.id),
        object: "chat.completion".to_string(),
        created,
        model: model.to_string(),
        choices: vec![Choice {
            index: 0,
            message: Some(message),
            delta: None,
            finish_reason: Some(map_stop_reason(resp.stop_reason.as_deref()).to_string()),
        }],
        usage: resp.usage.map(convert_usage),
    }
}

/// Map an Anthropic stop reason to an OpenAI finish reason. Unknown and
/// missing reasons map to `stop`.
pub fn map_stop_reason(reason: Option<&str>) -> &'static str {
    match reason {
        Some("end_turn") => "stop",
        Some("tool_use") => "tool_calls",
        Some("max_tokens") => "length",
        _ => "stop",
    }
}

pub fn convert_usage(usage: Usage) -> ChatUsage {
    ChatUsage {
        prompt_tokens: usage.input_tokens,
        completion_tokens: usage.output_tokens,
        total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
    }
}
