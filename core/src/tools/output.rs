//! Tool result values and their normalization into message content

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Content used when a tool returns nothing
pub const NO_RESULT: &str = "The operation completed but didn't return any results.";

/// Separator between list elements
pub const LIST_SEPARATOR: &str = ", ";

/// Raw value returned by a tool before it becomes message content
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// No result
    Empty,
    /// Ordered sequence of strings
    List(Vec<String>),
    /// Key/value record
    Record(Map<String, Value>),
    /// Plain text
    Text(String),
}

impl ToolOutput {
    /// Render the value as the string placed in a tool message.
    ///
    /// Records are pretty-printed with two-space indentation and sorted keys.
    pub fn normalize(&self) -> String {
        match self {
            ToolOutput::Empty => NO_RESULT.to_string(),
            ToolOutput::List(items) => items.join(LIST_SEPARATOR),
            ToolOutput::Record(map) => {
                let sorted: BTreeMap<&String, &Value> = map.iter().collect();
                serde_json::to_string_pretty(&sorted)
                    .unwrap_or_else(|_| Value::Object(map.clone()).to_string())
            }
            ToolOutput::Text(text) => text.clone(),
        }
    }

    /// Classify an arbitrary JSON value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => ToolOutput::Empty,
            Value::Array(items) => ToolOutput::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Object(map) => ToolOutput::Record(map),
            Value::String(s) => ToolOutput::Text(s),
            other => ToolOutput::Text(other.to_string()),
        }
    }
}

impl From<Vec<String>> for ToolOutput {
    fn from(items: Vec<String>) -> Self {
        ToolOutput::List(items)
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        ToolOutput::Text(text)
    }
}

impl From<Option<Map<String, Value>>> for ToolOutput {
    fn from(record: Option<Map<String, Value>>) -> Self {
        record.map_or(ToolOutput::Empty, ToolOutput::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_is_sentinel() {
        assert_eq!(ToolOutput::Empty.normalize(), NO_RESULT);
        assert_eq!(ToolOutput::from_value(Value::Null).normalize(), NO_RESULT);
    }

    #[test]
    fn test_list_separators() {
        let ids: Vec<String> = ["2401.00001", "2401.00002", "2401.00003"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = ToolOutput::List(ids).normalize();
        assert_eq!(out, "2401.00001, 2401.00002, 2401.00003");
        assert_eq!(out.matches(LIST_SEPARATOR).count(), 2);
        assert!(!out.ends_with(LIST_SEPARATOR));

        assert_eq!(ToolOutput::List(vec!["only".into()]).normalize(), "only");
        assert_eq!(ToolOutput::List(Vec::new()).normalize(), "");
    }

    #[test]
    fn test_record_pretty_sorted() {
        let map = json!({"title": "T", "authors": ["A", "B"], "published": "2024-01-02"})
            .as_object()
            .cloned()
            .unwrap();
        let out = ToolOutput::Record(map.clone()).normalize();

        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, Value::Object(map));
        assert!(out.contains("\n  \"authors\""));
        assert_eq!(out.matches("\"title\"").count(), 1);

        let authors = out.find("\"authors\"").unwrap();
        let published = out.find("\"published\"").unwrap();
        let title = out.find("\"title\"").unwrap();
        assert!(authors < published && published < title);
    }

    #[test]
    fn test_from_value_classification() {
        assert_eq!(
            ToolOutput::from_value(json!(["a", 1])),
            ToolOutput::List(vec!["a".into(), "1".into()])
        );
        assert_eq!(ToolOutput::from_value(json!(42)).normalize(), "42");
        assert_eq!(ToolOutput::from_value(json!(true)).normalize(), "true");
        assert_eq!(ToolOutput::from_value(json!("plain")).normalize(), "plain");
    }
}
