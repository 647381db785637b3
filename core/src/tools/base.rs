//! Base tool traits and structures

use crate::error::{Result, ToolError};
use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::tools::ToolOutput;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given call
    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput>;

    /// Static schema advertised to the model
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

/// A call to a tool, as requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Named arguments (a JSON object)
    pub arguments: serde_json::Value,

    /// Arguments exactly as the model sent them, resent verbatim in history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_arguments: Option<String>,
}

/// Name, description and parameter schema of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call with a generated id
    pub fn new<S: Into<String>>(name: S, arguments: serde_json::Value) -> Self {
        Self::with_id(format!("call_{}", Uuid::new_v4().simple()), name, arguments)
    }

    /// Create a tool call with a known id
    pub fn with_id<I: Into<String>, S: Into<String>>(
        id: I,
        name: S,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            raw_arguments: None,
        }
    }

    /// Build a call from the model's argument string. Text that is not JSON
    /// is kept as a string value so dispatch rejects it as invalid arguments.
    pub fn from_raw<I: Into<String>, S: Into<String>>(id: I, name: S, raw: String) -> Self {
        let arguments = if raw.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(&raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()))
        };

        Self {
            raw_arguments: Some(raw),
            ..Self::with_id(id, name, arguments)
        }
    }

    /// Argument text to send back to the model
    pub fn arguments_text(&self) -> String {
        self.raw_arguments
            .clone()
            .unwrap_or_else(|| self.arguments.to_string())
    }

    /// Get a required argument by key
    pub fn get_parameter<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .arguments
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ToolError::InvalidParameters {
                message: format!("Missing parameter: {}", key),
            })?;

        serde_json::from_value(value.clone()).map_err(|_| {
            ToolError::InvalidParameters {
                message: format!("Invalid parameter type for: {}", key),
            }
            .into()
        })
    }

    /// Get an optional argument, falling back to `default` only when absent.
    /// A present value of the wrong type is still an error.
    pub fn get_parameter_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.arguments.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(_) => self.get_parameter(key),
        }
    }
}

impl ToolSchema {
    /// Function-calling definition for the chat API
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.input_schema.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_get_parameter() {
        let call = ToolCall::new("search_papers", json!({"topic": "rust", "max_results": 3}));
        let topic: String = call.get_parameter("topic").unwrap();
        let max: usize = call.get_parameter("max_results").unwrap();
        assert_eq!(topic, "rust");
        assert_eq!(max, 3);
        assert!(call.id.starts_with("call_"));
    }

    #[test]
    fn test_missing_parameter() {
        let call = ToolCall::new("extract_info", json!({}));
        let err = call.get_parameter::<String>("paper_id").unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_parameter_default_and_type_error() {
        let call = ToolCall::new("search_papers", json!({"topic": "rust"}));
        assert_eq!(call.get_parameter_or("max_results", 5usize).unwrap(), 5);

        let call = ToolCall::new("search_papers", json!({"max_results": "many"}));
        assert!(call.get_parameter_or("max_results", 5usize).is_err());
    }

    #[test]
    fn test_from_raw_keeps_model_text() {
        let raw = r#"{"topic": "ml", "max_results": 3}"#;
        let call = ToolCall::from_raw("c1", "search_papers", raw.to_string());
        assert_eq!(call.arguments, json!({"topic": "ml", "max_results": 3}));
        assert_eq!(call.arguments_text(), raw);

        let call = ToolCall::from_raw("c2", "search_papers", String::new());
        assert_eq!(call.arguments, json!({}));
        assert_eq!(call.arguments_text(), "");

        let broken = r#"{"topic": "ml""#;
        let call = ToolCall::from_raw("c3", "search_papers", broken.to_string());
        assert_eq!(call.arguments, json!(broken));
        assert_eq!(call.arguments_text(), broken);
        assert!(call.get_parameter::<String>("topic").is_err());
    }

    #[test]
    fn test_schema_to_definition() {
        let schema = ToolSchema {
            name: "extract_info".to_string(),
            description: "Look up a paper".to_string(),
            input_schema: json!({"type": "object"}),
        };
        let def = schema.to_definition();
        assert_eq!(def.tool_type, "function");
        assert_eq!(def.function.name, "extract_info");

        let wire = serde_json::to_value(&schema).unwrap();
        assert!(wire.get("inputSchema").is_some());
    }
}
