// Tool definition and tool-choice translation (OpenAI → Anthropic)

use crate::error::{ProxyError, Result};
use crate::models::anthropic::{Tool, ToolChoice};
use crate::models::openai::ChatTool;
use serde_json::{json, Value};
use tracing::debug;

/// Effect of a client `tool_choice` on the outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoiceEffect {
    /// Send tools, optionally with an explicit choice.
    Keep(Option<ToolChoice>),
    /// `"none"`: send no tools at all.
    DropTools,
}

/// Rename each function definition into a backend tool record.
pub fn translate_tools(tools: &[ChatTool]) -> Vec<Tool> {
    tools
        .iter()
        .map(|t| Tool {
            name: t.function.name.clone(),
            description: t.function.description.clone(),
            // The backend requires a schema object even for argument-less tools
            input_schema: t
                .function
                .parameters
                .clone()
                .filter(|p| !p.is_null())
                .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
        })
        .collect()
}

/// Map a client `tool_choice` value.
///
/// Unrecognised strings and objects without a function name leave the
/// backend default in place.
pub fn translate_tool_choice(choice: &Value) -> ToolChoiceEffect {
    match choice {
        Value::String(s) => match s.as_str() {
            "auto" => ToolChoiceEffect::Keep(Some(ToolChoice::Auto)),
            "required" => ToolChoiceEffect::Keep(Some(ToolChoice::Any)),
            "none" => ToolChoiceEffect::DropTools,
            other => {
                debug!("Ignoring unknown tool_choice '{}'", other);
                ToolChoiceEffect::Keep(None)
            }
        },
        Value::Object(_) => {
            let name = choice
                .pointer("/function/name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty());
            ToolChoiceEffect::Keep(name.map(|n| ToolChoice::Tool {
                name: n.to_string(),
            }))
        }
        _ => ToolChoiceEffect::Keep(None),
    }
}

/// Parse a tool call's JSON `arguments` into structured input.
pub fn parse_tool_arguments(call_id: &str, arguments: &str) -> Result<Value> {
    if arguments.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(arguments).map_err(|e| {
        ProxyError::InvalidRequest(format!(
            "tool call {} has malformed arguments: {}",
            call_id, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::openai::FunctionDefinition;

    fn tool(name: &str, parameters: Option<Value>) -> ChatTool {
        ChatTool {
            tool_type: "function".into(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some("desc".into()),
                parameters,
            },
        }
    }

    #[test]
    fn test_translate_tools_renames_fields() {
        let schema = json!({"type": "object", "properties": {"city": {"type": "string"}}});
        let tools = translate_tools(&[tool("get_weather", Some(schema.clone()))]);

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "get_weather");
        assert_eq!(tools[0].description.as_deref(), Some("desc"));
        assert_eq!(tools[0].input_schema, schema);
    }

    #[test]
    fn test_missing_schema_gets_empty_object() {
        let tools = translate_tools(&[tool("ping", None)]);
        assert_eq!(tools[0].input_schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_tool_choice_strings() {
        assert_eq!(
            translate_tool_choice(&json!("auto")),
            ToolChoiceEffect::Keep(Some(ToolChoice::Auto))
        );
        assert_eq!(
            translate_tool_choice(&json!("required")),
            ToolChoiceEffect::Keep(Some(ToolChoice::Any))
        );
        assert_eq!(translate_tool_choice(&json!("none")), ToolChoiceEffect::DropTools);
        assert_eq!(translate_tool_choice(&json!("bogus")), ToolChoiceEffect::Keep(None));
    }

    #[test]
    fn test_tool_choice_named_function() {
        let choice = json!({"type": "function", "function": {"name": "get_weather"}});
        assert_eq!(
            translate_tool_choice(&choice),
            ToolChoiceEffect::Keep(Some(ToolChoice::Tool { name: "get_weather".into() }))
        );
        assert_eq!(
            translate_tool_choice(&json!({"type": "function"})),
            ToolChoiceEffect::Keep(None)
        );
    }

    #[test]
    fn test_parse_tool_arguments() {
        assert_eq!(parse_tool_arguments("c1", r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(parse_tool_arguments("c1", "").unwrap(), json!({}));
        assert!(matches!(
            parse_tool_arguments("c1", "{not json"),
            Err(ProxyError::InvalidRequest(_))
        ));
    }
}
