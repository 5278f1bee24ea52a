//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graphsync_graph::{GraphClient, GraphConfig, Synchronizer};

pub mod export;
pub mod ingest;
pub mod node;
pub mod serve;
pub mod status;

/// Synchronize node-link graph documents with a Neo4j property graph
#[derive(Parser)]
#[command(name = "graphsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML file with connection settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bolt URI of the graph store
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub uri: Option<String>,

    /// Graph store user
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub user: Option<String>,

    /// Graph store password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API
    Serve(serve::ServeArgs),

    /// Load a node-link JSON document into the graph
    Ingest(ingest::IngestArgs),

    /// Write the stored graph as a node-link JSON document
    Export(export::ExportArgs),

    /// Show one node with all of its properties
    Show {
        /// Node id (frontend_id)
        id: String,
    },

    /// Delete one node and its relationships
    Delete {
        /// Node id (frontend_id)
        id: String,
    },

    /// Show node and relationship counts
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.graph_config()?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, &config).await,
            Commands::Ingest(args) => ingest::execute(args, &config).await,
            Commands::Export(args) => export::execute(args, &config).await,
            Commands::Show { id } => node::show(&id, &config).await,
            Commands::Delete { id } => node::delete(&id, &config).await,
            Commands::Status => status::execute(&config).await,
        }
    }

    /// Defaults, then the config file, then environment, then flags.
    fn graph_config(&self) -> Result<GraphConfig> {
        let mut config = GraphConfig::load(self.config.as_deref())
            .context("Failed to load graph configuration")?;

        if let Some(uri) = &self.uri {
            config.uri = uri.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        Ok(config)
    }
}

/// Connect to the graph store; failure here ends the process.
pub async fn connect(config: &GraphConfig) -> Result<GraphClient> {
    GraphClient::connect(config)
        .await
        .with_context(|| format!("Cannot reach graph store at {}", config.uri))
}

/// Build a synchronizer over a fresh connection.
pub async fn synchronizer(config: &GraphConfig) -> Result<Synchronizer> {
    let client = connect(config).await?;
    Ok(Synchronizer::new(Arc::new(client)))
}
