//! Paper search tool

use crate::error::{Result, ToolError};
use crate::papers::{PaperSource, PaperStore};
use crate::tools::{Tool, ToolCall, ToolOutput};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Default number of papers returned by a search
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Searches arXiv for a topic and stores what it finds
pub struct SearchPapersTool {
    source: Arc<dyn PaperSource>,
    store: PaperStore,
}

impl SearchPapersTool {
    pub fn new(source: Arc<dyn PaperSource>, store: PaperStore) -> Self {
        Self { source, store }
    }
}

#[async_trait]
impl Tool for SearchPapersTool {
    fn name(&self) -> &str {
        "search_papers"
    }

    fn description(&self) -> &str {
        "Search for papers on arXiv based on a topic and store their information locally"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "The topic to search for"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to retrieve",
                    "default": DEFAULT_MAX_RESULTS
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput> {
        let topic: String = call.get_parameter("topic")?;
        let max_results: usize = call.get_parameter_or("max_results", DEFAULT_MAX_RESULTS)?;

        if topic.trim().is_empty() {
            return Err(ToolError::InvalidParameters {
                message: "topic cannot be empty".to_string(),
            }
            .into());
        }
        if max_results == 0 {
            return Err(ToolError::InvalidParameters {
                message: "max_results must be at least 1".to_string(),
            }
            .into());
        }

        let papers = self.source.search(&topic, max_results).await?;
        let path = self.store.save(&topic, &papers).await?;
        tracing::info!(topic = %topic, path = %path.display(), "stored {} papers", papers.len());

        Ok(ToolOutput::List(papers.into_iter().map(|p| p.id).collect()))
    }
}
