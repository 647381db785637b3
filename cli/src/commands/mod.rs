//! CLI command implementations

pub mod chat;
pub mod probe;
pub mod serve;
pub mod tools;

pub use chat::{chat_command, ChatArgs, ToolChoiceArg};
pub use probe::probe_command;
pub use serve::serve_command;
pub use tools::tools_command;

use anyhow::{Context, Result};
use paperchat_core::papers::{ArxivClient, PaperStore};
use paperchat_core::tools::paper_tools;
use paperchat_core::ToolExecutor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Executor over the paper tools backed by arXiv and `papers_dir`
pub(crate) fn local_executor(papers_dir: PathBuf, timeout: Duration) -> Result<ToolExecutor> {
    let source = ArxivClient::new(timeout).context("Failed to create arXiv client")?;
    let registry = paper_tools(Arc::new(source), PaperStore::new(papers_dir))?;
    Ok(ToolExecutor::new(Arc::new(registry)))
}
