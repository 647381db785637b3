//! Console output handler

use async_trait::async_trait;
use colored::Colorize;
use paperchat_core::output::{AgentEvent, AgentOutput, OutputError, ToolExecutionStatus};

/// Shown when the model asks for tools on a query that did not allow them
pub const POLICY_HINT: &str = "Skipping tool call because it's not a research-related query.\nGPT likely misunderstood. Try rephrasing.";

/// Prints agent events to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleOutput {
    /// Also print tool results and token usage
    pub verbose: bool,
}

impl ConsoleOutput {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Text printed for an event, `None` for events that stay silent
    pub fn render(&self, event: &AgentEvent) -> Option<String> {
        match event {
            AgentEvent::AssistantText { text } => Some(text.clone()),
            AgentEvent::ToolExecutionStarted { tool_info } => Some(
                format!(
                    "Calling tool {} with args {}",
                    tool_info.tool_name, tool_info.arguments
                )
                .cyan()
                .to_string(),
            ),
            AgentEvent::ToolExecutionCompleted { tool_info } => match tool_info.status {
                ToolExecutionStatus::Error => tool_info
                    .content
                    .as_ref()
                    .map(|content| content.red().to_string()),
                _ if self.verbose => tool_info
                    .content
                    .as_ref()
                    .map(|content| content.dimmed().to_string()),
                _ => None,
            },
            AgentEvent::PolicyViolation { .. } => Some(POLICY_HINT.yellow().to_string()),
            AgentEvent::TokenUsageUpdated { token_usage } if self.verbose => Some(
                format!(
                    "Tokens: {} input + {} output = {} total",
                    token_usage.input_tokens, token_usage.output_tokens, token_usage.total_tokens
                )
                .dimmed()
                .to_string(),
            ),
            AgentEvent::TokenUsageUpdated { .. } => None,
        }
    }
}

#[async_trait]
impl AgentOutput for ConsoleOutput {
    async fn emit_event(&self, event: AgentEvent) -> Result<(), OutputError> {
        if let Some(text) = self.render(&event) {
            println!("{}", text);
        }
        Ok(())
    }
}
