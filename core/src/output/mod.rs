//! Output abstraction layer for the chat agent
//!
//! The agent reports what it is doing through [`AgentOutput`]. Console,
//! logging and test implementations live with their callers.

use crate::tools::ToolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type returned by output handlers
pub type OutputError = Box<dyn std::error::Error + Send + Sync>;

/// Null output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(&self, _event: AgentEvent) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Status of tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolExecutionStatus {
    /// Tool is currently executing
    Executing,
    /// Tool completed successfully
    Success,
    /// Tool failed with an error
    Error,
}

/// Tool execution information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionInfo {
    /// Id of the tool call being executed
    pub execution_id: String,
    /// Tool name
    pub tool_name: String,
    /// Arguments as sent by the model
    pub arguments: serde_json::Value,
    /// Current execution status
    pub status: ToolExecutionStatus,
    /// Content placed in the tool message (if completed)
    pub content: Option<String>,
    /// Timestamp of status change
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ToolExecutionInfo {
    pub fn new(call: &ToolCall, status: ToolExecutionStatus, content: Option<String>) -> Self {
        Self {
            execution_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            status,
            content,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct TokenUsage {
    /// Total input tokens consumed
    pub input_tokens: u32,
    /// Total output tokens generated
    pub output_tokens: u32,
    /// Total tokens (input + output)
    pub total_tokens: u32,
}

/// Events that can be emitted while a query is processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// Text produced by the model
    AssistantText { text: String },
    /// Tool execution started
    ToolExecutionStarted { tool_info: ToolExecutionInfo },
    /// Tool execution completed
    ToolExecutionCompleted { tool_info: ToolExecutionInfo },
    /// The model requested tools while tool use was disabled
    PolicyViolation { tools: Vec<String> },
    /// Token usage updated (emitted after each LLM call)
    TokenUsageUpdated { token_usage: TokenUsage },
}

/// Abstract output interface for agent execution
#[async_trait]
pub trait AgentOutput: Send + Sync {
    /// Emit an agent event
    async fn emit_event(&self, event: AgentEvent) -> Result<(), OutputError>;

    /// Emit token usage update
    async fn emit_token_update(&self, token_usage: TokenUsage) -> Result<(), OutputError> {
        self.emit_event(AgentEvent::TokenUsageUpdated { token_usage })
            .await
    }
}
