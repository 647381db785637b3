//! # paperchat Core
//!
//! Core library for paperchat, a research assistant that answers questions
//! about arXiv papers by letting a language model call paper tools.
//!
//! The building blocks are a tool registry and executor, an append-only
//! conversation, the model/tool orchestration loop and an interactive
//! session driver. Tools can run in process or behind a JSON-RPC tool
//! server (see [`mcp`]).

// Core modules
pub mod agent;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod output;
pub mod papers;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use agent::{Agent, AgentBuilder, AgentConfig, AgentCore, AgentExecution, ToolPolicy};
pub use config::{ModelParams, Protocol, ResolvedLlmConfig};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use session::ChatSession;
pub use tools::{ToolBackend, ToolExecutor, ToolRegistry};

/// Current version of the paperchat-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
///
/// Logs go to stderr so stdout stays free for the chat and the tool server.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode
///
/// `RUST_LOG` takes precedence over the chosen level when set.
pub fn init_tracing_with_debug(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
