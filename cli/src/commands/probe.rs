//! Search a topic and show the first paper found

use crate::config::CliConfigLoader;
use anyhow::Result;
use paperchat_core::tools::{builtin::DEFAULT_MAX_RESULTS, ToolCall};
use serde_json::json;
use std::time::Duration;

/// Run `search_papers` then `extract_info` on the first result
pub async fn probe_command(
    config_loader: CliConfigLoader,
    topic: String,
    max_results: Option<usize>,
) -> Result<()> {
    let config = config_loader.load().await?;
    let timeout = Duration::from_secs(config.agent_config().tool_timeout_secs);
    let executor = super::local_executor(config.papers_dir(), timeout)?;

    let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let search = ToolCall::new(
        "search_papers",
        json!({"topic": topic, "max_results": max_results}),
    );
    let listing = executor.execute(&search).await?;
    let paper_ids: Vec<&str> = listing
        .split(", ")
        .filter(|id| !id.is_empty() && *id != paperchat_core::tools::NO_RESULT)
        .collect();

    println!("Found {} papers:", paper_ids.len());
    for id in &paper_ids {
        println!("{}", id);
    }

    if let Some(first_paper_id) = paper_ids.first() {
        println!("\nExtracting info for paper: {}", first_paper_id);
        let extract = ToolCall::new("extract_info", json!({"paper_id": first_paper_id}));
        println!("{}", executor.execute(&extract).await?);
    }

    Ok(())
}
