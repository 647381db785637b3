//! Tool execution and the backend seam used by the agent

use crate::error::{Error, Result, ToolError};
use crate::tools::{ToolCall, ToolRegistry, ToolSchema};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Source of tools for the orchestration loop, in-process or remote
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Schemas of all tools this backend serves
    async fn list_tools(&self) -> Result<Vec<ToolSchema>>;

    /// Run a call and return its normalized content
    async fn invoke(&self, call: &ToolCall) -> Result<String>;
}

/// Runs registered tools and normalizes their results
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool call and normalize its output
    pub async fn execute(&self, call: &ToolCall) -> Result<String> {
        let tool = self.registry.lookup(&call.name)?;

        if !call.arguments.is_object() {
            return Err(ToolError::InvalidParameters {
                message: format!("Arguments for {} must be a JSON object", call.name),
            }
            .into());
        }

        let start_time = Instant::now();
        let result = tool.execute(call).await;
        let duration = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                tracing::debug!(tool = %call.name, duration_ms = duration, "tool completed");
                Ok(output.normalize())
            }
            Err(Error::Tool(e)) => {
                tracing::warn!(tool = %call.name, duration_ms = duration, "tool failed: {}", e);
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, duration_ms = duration, "tool failed: {}", e);
                Err(ToolError::ExecutionFailed {
                    name: call.name.clone(),
                    message: e.to_string(),
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl ToolBackend for ToolExecutor {
    async fn list_tools(&self) -> Result<Vec<ToolSchema>> {
        Ok(self.registry.schemas())
    }

    async fn invoke(&self, call: &ToolCall) -> Result<String> {
        self.execute(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::tests::EchoTool;
    use crate::tools::{Tool, ToolOutput};
    use serde_json::json;

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolOutput> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "papers directory missing",
            )))
        }
    }

    struct NothingTool;

    #[async_trait]
    impl Tool for NothingTool {
        fn name(&self) -> &str {
            "nothing"
        }

        fn description(&self) -> &str {
            "Returns no result"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolOutput> {
            Ok(ToolOutput::Empty)
        }
    }

    fn executor() -> ToolExecutor {
        let registry = ToolRegistry::builder()
            .register(EchoTool { name: "echo" })
            .register(FailingTool)
            .register(NothingTool)
            .build()
            .unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_execute_success() {
        let call = ToolCall::new("echo", json!({"text": "hello"}));
        assert_eq!(executor().execute(&call).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_empty_result_normalized() {
        let call = ToolCall::new("nothing", json!({}));
        assert_eq!(
            executor().invoke(&call).await.unwrap(),
            crate::tools::NO_RESULT
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let call = ToolCall::new("missing", json!({}));
        let err = executor().execute(&call).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_non_object_arguments() {
        let call = ToolCall::new("echo", json!("hello"));
        let err = executor().execute(&call).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidParameters { .. })));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let call = ToolCall::new("echo", json!({}));
        let err = executor().execute(&call).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidParameters { .. })));
    }

    #[tokio::test]
    async fn test_failure_wrapped() {
        let call = ToolCall::new("failing", json!({}));
        let err = executor().execute(&call).await.unwrap_err();
        match err {
            Error::Tool(ToolError::ExecutionFailed { name, message }) => {
                assert_eq!(name, "failing");
                assert!(message.contains("papers directory missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_tools() {
        let schemas = executor().list_tools().await.unwrap();
        let names: Vec<_> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "failing", "nothing"]);
    }
}
