//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod executor;
pub mod output;
pub mod registry;

pub use base::{Tool, ToolCall, ToolSchema};
pub use builtin::paper_tools;
pub use executor::{ToolBackend, ToolExecutor};
pub use output::{ToolOutput, NO_RESULT};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
