//! Graph status command.

use anyhow::Result;
use colored::Colorize;
use graphsync_graph::GraphConfig;

pub async fn execute(config: &GraphConfig) -> Result<()> {
    let sync = super::synchronizer(config).await?;
    let counts = sync.status().await?;

    println!("{}", "Graph Status".bold());
    println!("{}", "─".repeat(30));
    println!("  {}   {}", "Store".dimmed(), config.uri);
    println!("  {}   {}", "Nodes".dimmed(), counts.nodes.to_string().cyan());
    println!("  {}   {}", "Edges".dimmed(), counts.relationships.to_string().cyan());
    Ok(())
}
