//! Error types and handling for paperchat core

use thiserror::Error;

/// Result type alias for paperchat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for paperchat core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Tool server protocol errors
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    /// Conversation ordering errors
    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Duplicate tool name: {name}")]
    DuplicateTool { name: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Model call timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Tool timeout: {name}")]
    Timeout { name: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum iterations exceeded: {max_iterations}")]
    MaxIterationsExceeded { max_iterations: usize },

    #[error("Model requested tools ({}) while tool use was disabled for this query", .tools.join(", "))]
    PolicyViolation { tools: Vec<String> },
}

/// Tool server protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Server returned error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {method}")]
    Timeout { method: String },

    #[error("Server unavailable: {0}")]
    ServerUnavailable(String),
}

impl McpError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i64 {
        use crate::mcp::types::error_codes;
        match self {
            McpError::Parse(_) => error_codes::PARSE_ERROR,
            McpError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::Remote { code, .. } => *code,
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}

/// Conversation ordering errors
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Tool message references unknown call id: {tool_call_id}")]
    OrphanToolMessage { tool_call_id: String },

    #[error("Tool call {tool_call_id} already has a result")]
    DuplicateToolResult { tool_call_id: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
