//! Payload ingestion command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use graphsync_graph::{GraphConfig, IngestMode, MemoryStore, Synchronizer};
use serde_json::Value;

use crate::output;

#[derive(Args)]
pub struct IngestArgs {
    /// Node-link JSON document
    pub file: PathBuf,

    /// overwrite replaces the stored graph, merge upserts into it
    #[arg(long, default_value_t = IngestMode::Overwrite)]
    pub mode: IngestMode,

    /// Ingest into an in-memory graph and only print the report
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: IngestArgs, config: &GraphConfig) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;

    let sync = if args.dry_run {
        println!("{}", "Dry run: nothing is written to the graph store.".dimmed());
        Synchronizer::new(Arc::new(MemoryStore::new()))
    } else {
        super::synchronizer(config).await?
    };

    println!("{} {} ({})", "Ingesting".bold(), args.file.display(), args.mode.to_string().cyan());
    let report = sync.ingest(&payload, args.mode).await?;
    output::print_report(&report);

    Ok(())
}
