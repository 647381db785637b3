//! Tool server command

use crate::config::CliConfigLoader;
use anyhow::Result;
use paperchat_core::mcp::{McpServer, StdioTransport};
use std::time::Duration;
use tracing::info;

/// Serve the paper tools over stdio until the client disconnects
pub async fn serve_command(config_loader: CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;
    let papers_dir = config.papers_dir();
    let timeout = Duration::from_secs(config.agent_config().tool_timeout_secs);

    info!("Serving paper tools, papers dir: {}", papers_dir.display());

    let executor = super::local_executor(papers_dir, timeout)?;
    let mut server = McpServer::new(executor);
    let mut transport = StdioTransport::new();
    server.run(&mut transport).await?;

    Ok(())
}
