//! Agent execution result structures

use crate::output::TokenUsage;
use serde::{Deserialize, Serialize};

/// Outcome of one completed turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentExecution {
    /// Text of the final assistant message, if it had any
    pub final_text: Option<String>,

    /// Number of model requests made
    pub iterations: usize,

    /// Number of tool calls dispatched
    pub tool_calls_executed: usize,

    /// Number of messages appended to the conversation
    pub messages_appended: usize,

    /// Tokens consumed across all model requests of the turn
    pub token_usage: TokenUsage,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}
