//! Interactive chat command

use crate::config::CliConfigLoader;
use crate::output::ConsoleOutput;
use anyhow::{Context, Result};
use clap::ValueEnum;
use paperchat_core::mcp::McpToolBackend;
use paperchat_core::{AgentBuilder, ChatSession, ToolBackend, ToolPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;

/// Tool-choice policy selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolChoiceArg {
    /// Always let the model decide
    Auto,
    /// Allow tools only for research-related queries
    Keywords,
}

/// Options for the chat command
#[derive(Debug, Clone, Default)]
pub struct ChatArgs {
    /// Use a tool server process instead of in-process tools
    pub remote: bool,
    /// Command line of the tool server, defaults to `paperchat serve`
    pub server_command: Vec<String>,
    pub tool_choice: Option<ToolChoiceArg>,
    pub max_iterations: Option<usize>,
    pub verbose: bool,
}

/// Start an interactive chat session on stdin/stdout
pub async fn chat_command(config_loader: CliConfigLoader, options: ChatArgs) -> Result<()> {
    let config = config_loader.load().await?;
    let llm_config = config.llm_config()?;
    info!("Using protocol: {}", llm_config.protocol.as_str());
    info!("Using model: {}", llm_config.model);

    let mut agent_config = config.agent_config();
    if let Some(max_iterations) = options.max_iterations {
        agent_config.max_iterations = max_iterations;
    }
    let remote = options.remote || !options.server_command.is_empty();
    agent_config.tool_policy = match options.tool_choice {
        Some(ToolChoiceArg::Auto) => ToolPolicy::Auto,
        Some(ToolChoiceArg::Keywords) => ToolPolicy::keyword_gated(),
        // The tool server variant never gated tools
        None if remote => ToolPolicy::Auto,
        None => agent_config.tool_policy,
    };

    let timeout = Duration::from_secs(agent_config.tool_timeout_secs);
    let server_command = if options.server_command.is_empty() {
        config.raw.server_command.clone()
    } else {
        options.server_command.clone()
    };

    let backend: Arc<dyn ToolBackend> = if remote {
        let (program, args) = server_invocation(server_command, &config.papers_dir())?;
        let client = McpToolBackend::spawn(&program, &args, timeout)
            .await
            .with_context(|| format!("Failed to connect to tool server: {}", program))?;
        let names: Vec<&str> = client.tools().iter().map(|t| t.name.as_str()).collect();
        println!("\nConnected to server with tools: {:?}", names);
        Arc::new(client)
    } else {
        Arc::new(super::local_executor(config.papers_dir(), timeout)?)
    };

    let agent = AgentBuilder::new(llm_config)
        .with_agent_config(agent_config)
        .with_tool_backend(backend)
        .build_with_output(Box::new(ConsoleOutput::new(options.verbose)))?;

    let mut session = ChatSession::new(agent);
    let mut stdout = tokio::io::stdout();
    let processed = session
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    info!(
        "Session {} ended after {} queries",
        session.conversation().id(),
        processed
    );
    Ok(())
}

/// Program and arguments that start the tool server
fn server_invocation(
    command: Vec<String>,
    papers_dir: &std::path::Path,
) -> Result<(String, Vec<String>)> {
    let mut parts = command.into_iter();
    match parts.next() {
        Some(program) => Ok((program, parts.collect())),
        None => {
            let exe = std::env::current_exe().context("Failed to locate the paperchat binary")?;
            Ok((
                exe.to_string_lossy().into_owned(),
                vec![
                    "--papers-dir".to_string(),
                    papers_dir.to_string_lossy().into_owned(),
                    "serve".to_string(),
                ],
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_explicit_server_command() {
        let (program, args) = server_invocation(
            vec!["python".to_string(), "server.py".to_string()],
            Path::new("papers"),
        )
        .unwrap();
        assert_eq!(program, "python");
        assert_eq!(args, vec!["server.py"]);
    }

    #[test]
    fn test_default_server_command_runs_serve() {
        let (_, args) = server_invocation(Vec::new(), Path::new("/tmp/p")).unwrap();
        assert_eq!(args, vec!["--papers-dir", "/tmp/p", "serve"]);
    }
}
