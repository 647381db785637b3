//! Serving and consuming tools across a process boundary
//!
//! JSON-RPC 2.0 over newline-delimited stdio, using MCP method names.

pub mod client;
pub mod server;
pub mod transport;
pub mod types;

pub use client::McpToolBackend;
pub use server::McpServer;
pub use transport::{ChannelTransport, McpTransport, ProcessTransport, StdioTransport};
pub use types::PROTOCOL_VERSION;
