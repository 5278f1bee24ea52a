//! Graph export command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use graphsync_graph::GraphConfig;

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: ExportArgs, config: &GraphConfig) -> Result<()> {
    let sync = super::synchronizer(config).await?;
    let snapshot = sync.retrieve_all().await;
    let json = serde_json::to_string_pretty(&snapshot)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} nodes, {} edges to {}",
                "Exported".green().bold(),
                snapshot.nodes.len(),
                snapshot.edges.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
