//! Agent core logic and execution engine

pub mod base;
pub mod config;
pub mod core;
pub mod execution;
pub mod policy;

pub use base::{Agent, AgentResult};
pub use config::{AgentBuilder, AgentConfig};
pub use core::AgentCore;
pub use execution::AgentExecution;
pub use policy::{ToolPolicy, DEFAULT_TOOL_KEYWORDS};
