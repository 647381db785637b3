//! Stored paper lookup tool

use crate::error::Result;
use crate::papers::PaperStore;
use crate::tools::{Tool, ToolCall, ToolOutput};
use async_trait::async_trait;
use serde_json::json;

/// Looks up a paper previously stored by `search_papers`
pub struct ExtractInfoTool {
    store: PaperStore,
}

impl ExtractInfoTool {
    pub fn new(store: PaperStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ExtractInfoTool {
    fn name(&self) -> &str {
        "extract_info"
    }

    fn description(&self) -> &str {
        "Search for information about a specific paper across all topics"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "paper_id": {
                    "type": "string",
                    "description": "The ID of the paper to look for"
                }
            },
            "required": ["paper_id"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput> {
        let paper_id: String = call.get_parameter("paper_id")?;

        match self.store.find(paper_id.trim()).await? {
            Some(info) => match serde_json::to_value(info)? {
                serde_json::Value::Object(map) => Ok(ToolOutput::Record(map)),
                other => Ok(ToolOutput::from_value(other)),
            },
            None => {
                tracing::debug!(paper_id = %paper_id, "paper not found in store");
                Ok(ToolOutput::Empty)
            }
        }
    }
}
