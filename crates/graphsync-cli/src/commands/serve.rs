//! Web server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use graphsync_graph::{GraphConfig, Synchronizer};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, config: &GraphConfig) -> Result<()> {
    let client = Arc::new(super::connect(config).await?);
    let sync = Synchronizer::new(client.clone());

    println!();
    println!("  {} {}", "Graphsync".cyan().bold(), "API Server".bold());
    println!();
    println!("  {}      {}", "Store".green(), config.uri);
    println!("  {}        http://{}:{}/api", "API".green(), args.host, args.port);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown requested");
    };
    let served = graphsync_web::run_server(sync, &args.host, args.port, shutdown).await;

    // The router's handle is gone once the server returns.
    match Arc::into_inner(client) {
        Some(client) => client.close(),
        None => tracing::warn!("Graph store still in use at shutdown, released with its last handle"),
    }
    served
}
