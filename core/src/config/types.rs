//! Minimal configuration types for paperchat core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Supported LLM protocols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// OpenAI-compatible API (includes OpenAI, many proxies, local models)
    #[serde(rename = "openai_compat")]
    OpenAICompat,
    /// Custom protocol
    #[serde(rename = "custom")]
    Custom(String),
}

impl Protocol {
    /// Get the protocol name as a string
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::OpenAICompat => "openai_compat",
            Protocol::Custom(name) => name,
        }
    }

    /// Get the default base URL for this protocol
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Protocol::OpenAICompat => Some("https://api.openai.com/v1"),
            Protocol::Custom(_) => None,
        }
    }
}

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// The protocol to use
    pub protocol: Protocol,
    /// Base URL for the API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
    /// Additional headers for requests
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(protocol: Protocol, base_url: String, api_key: String, model: String) -> Self {
        Self {
            protocol,
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
            headers: HashMap::new(),
        }
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Add multiple headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err("Top-p must be between 0.0 and 1.0".to_string());
            }
        }

        if self.params.max_tokens == Some(0) {
            return Err("max_tokens must be greater than zero".to_string());
        }

        Ok(())
    }
}
