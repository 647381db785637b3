//! Tools listing command

use crate::config::CliConfigLoader;
use anyhow::Result;
use colored::Colorize;
use std::time::Duration;
use tracing::info;

/// Show available tools
pub async fn tools_command(config_loader: CliConfigLoader) -> Result<()> {
    info!("Listing available tools");

    let config = config_loader.load().await?;
    let executor = super::local_executor(config.papers_dir(), Duration::from_secs(30))?;

    println!("{}\n", "Available Tools".bold());
    for schema in executor.registry().schemas() {
        println!("{}", schema.name.green());
        // Show first line of description only for brevity
        let first_line = schema.description.lines().next().unwrap_or_default();
        println!("   {}", first_line);
        println!("   {}\n", serde_json::to_string(&schema.input_schema)?.dimmed());
    }

    Ok(())
}
