//! Agent configuration structures

use super::policy::ToolPolicy;
use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::{ConfigError, Result};
use crate::llm::{LlmClient, OpenAiClient};
use crate::output::{AgentOutput, NullOutput};
use crate::tools::ToolBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum number of model requests per query
    pub max_iterations: usize,

    /// Response size limit sent with every model request
    pub max_tokens: u32,

    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,

    /// Nucleus sampling cutoff, provider default when unset
    pub top_p: Option<f32>,

    /// Timeout for a single model request
    pub llm_timeout_secs: u64,

    /// Timeout for a single tool invocation
    pub tool_timeout_secs: u64,

    /// When the model may call tools
    pub tool_policy: ToolPolicy,

    /// Custom system prompt prepended to every request (optional)
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            max_tokens: 2024,
            temperature: None,
            top_p: None,
            llm_timeout_secs: 120,
            tool_timeout_secs: 60,
            tool_policy: ToolPolicy::default(),
            system_prompt: None,
        }
    }
}

impl AgentConfig {
    /// Reject limits under which no turn could ever reach the model
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("max_iterations", self.max_iterations as u64),
            ("max_tokens", self.max_tokens as u64),
            ("llm_timeout_secs", self.llm_timeout_secs),
            ("tool_timeout_secs", self.tool_timeout_secs),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: "0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Builder for creating agents with resolved LLM configuration
pub struct AgentBuilder {
    llm_config: ResolvedLlmConfig,
    agent_config: AgentConfig,
    backend: Option<Arc<dyn ToolBackend>>,
}

impl AgentBuilder {
    /// Create a new agent builder with LLM configuration
    pub fn new(llm_config: ResolvedLlmConfig) -> Self {
        Self {
            llm_config,
            agent_config: AgentConfig::default(),
            backend: None,
        }
    }

    /// Set agent configuration
    pub fn with_agent_config(mut self, agent_config: AgentConfig) -> Self {
        self.agent_config = agent_config;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent_config.max_iterations = max_iterations;
        self
    }

    pub fn with_tool_policy(mut self, tool_policy: ToolPolicy) -> Self {
        self.agent_config.tool_policy = tool_policy;
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.agent_config.system_prompt = system_prompt;
        self
    }

    /// Tools the agent dispatches to, local or remote
    pub fn with_tool_backend(mut self, backend: Arc<dyn ToolBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build the agent with the given output handler
    pub fn build_with_output(self, output: Box<dyn AgentOutput>) -> Result<super::AgentCore> {
        let backend = self.backend.ok_or_else(|| ConfigError::MissingField {
            field: "tool_backend".to_string(),
        })?;

        self.agent_config.validate()?;

        self.llm_config
            .validate()
            .map_err(|message| ConfigError::InvalidValue {
                field: "llm".to_string(),
                value: message,
            })?;

        let llm_client: Arc<dyn LlmClient> = match &self.llm_config.protocol {
            Protocol::OpenAICompat => Arc::new(OpenAiClient::new(&self.llm_config)?),
            Protocol::Custom(name) => {
                return Err(ConfigError::InvalidValue {
                    field: "protocol".to_string(),
                    value: name.clone(),
                }
                .into())
            }
        };

        Ok(super::AgentCore::new(
            self.agent_config,
            llm_client,
            backend,
            output,
        ))
    }

    /// Build the agent with null output (for testing)
    pub fn build(self) -> Result<super::AgentCore> {
        self.build_with_output(Box::new(NullOutput))
    }
}
