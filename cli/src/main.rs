//! # paperchat CLI
//!
//! Command-line interface for paperchat - chat with a research assistant that
//! searches arXiv and reads paper metadata through tool calls.
//!
//! ## Usage
//!
//! - `paperchat` - Start an interactive chat with in-process tools
//! - `paperchat --remote` - Chat through a tool server process
//! - `paperchat serve` - Serve the paper tools over stdio
//! - `paperchat tools` - Show available tools
//! - `paperchat probe --topic "..."` - Search a topic and show the first paper

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{
    chat_command, probe_command, serve_command, tools_command, ChatArgs, ToolChoiceArg,
};
use config::CliConfigLoader;

/// paperchat - chat with a research assistant over arXiv papers
#[derive(Parser)]
#[command(name = "paperchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with a research assistant that searches arXiv for you")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API key override
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory where paper metadata is stored
    #[arg(long, global = true)]
    papers_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use tools from a tool server process
    #[arg(long)]
    remote: bool,

    /// Command that starts the tool server (implies --remote)
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "CMD")]
    server_command: Vec<String>,

    /// When the model may call tools
    #[arg(long, value_enum)]
    tool_choice: Option<ToolChoiceArg>,

    /// Maximum number of model requests per query
    #[arg(long)]
    max_iterations: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the paper tools over stdio (JSON-RPC)
    Serve,

    /// Show available tools
    Tools,

    /// Search a topic and print the first paper's details
    Probe {
        /// Topic to search for
        #[arg(long, default_value = "computers")]
        topic: String,

        /// Maximum number of papers to fetch
        #[arg(long)]
        max_results: Option<usize>,
    },
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(papers_dir) = &cli.papers_dir {
        loader = loader.with_papers_dir_override(papers_dir.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pick up OPENAI_* from a local .env before any config lookup
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the chat or the tool protocol
    paperchat_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Some(Commands::Serve) => serve_command(config_loader).await,
        Some(Commands::Tools) => tools_command(config_loader).await,
        Some(Commands::Probe { topic, max_results }) => {
            probe_command(config_loader, topic, max_results).await
        }
        // Default to interactive chat
        None => {
            let args = ChatArgs {
                remote: cli.remote,
                server_command: cli.server_command,
                tool_choice: cli.tool_choice,
                max_iterations: cli.max_iterations,
                verbose: cli.verbose,
            };
            chat_command(config_loader, args).await
        }
    }
}
