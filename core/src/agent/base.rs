//! Base agent trait

use super::config::AgentConfig;
use super::execution::AgentExecution;
use crate::conversation::Conversation;
use crate::error::Result;
use async_trait::async_trait;

/// Result type for agent operations
pub type AgentResult<T> = Result<T>;

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer one user query, appending every message of the turn to
    /// `conversation`
    async fn process_query(
        &self,
        query: &str,
        conversation: &mut Conversation,
    ) -> AgentResult<AgentExecution>;

    /// Get the agent's configuration
    fn config(&self) -> &AgentConfig;

    /// Get the agent's name/type
    fn agent_type(&self) -> &str;
}
