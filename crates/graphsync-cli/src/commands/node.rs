//! Single-node commands.

use anyhow::Result;
use colored::Colorize;
use graphsync_graph::GraphConfig;

use crate::output;

pub async fn show(id: &str, config: &GraphConfig) -> Result<()> {
    let sync = super::synchronizer(config).await?;

    match sync.get_node_detail(id).await? {
        Some(detail) => output::print_node_detail(&detail),
        None => println!("{} {}", "Node not found:".red(), id),
    }
    Ok(())
}

pub async fn delete(id: &str, config: &GraphConfig) -> Result<()> {
    let sync = super::synchronizer(config).await?;

    if sync.delete_node(id).await? {
        println!("{} {}", "Deleted".green().bold(), id);
    } else {
        println!("{} {}", "Already absent:".dimmed(), id);
    }
    Ok(())
}
