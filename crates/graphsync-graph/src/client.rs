//! Neo4j connection client.

use std::path::Path;
use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::error::{GraphError, GraphResult};

pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USER: &str = "NEO4J_USER";
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
    pub fetch_size: usize,
    pub connect_timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
            max_connections: 8,
            fetch_size: 200,
            connect_timeout_secs: 10,
        }
    }
}

impl GraphConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> GraphResult<Self> {
        toml::from_str(raw).map_err(|e| GraphError::Config(e.to_string()))
    }

    /// Defaults, overlaid by the TOML file at `path` (if any), overlaid by
    /// `NEO4J_*` environment variables.
    pub fn load(path: Option<&Path>) -> GraphResult<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    GraphError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Overlay values returned by `lookup` for the `NEO4J_*` keys.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(uri) = lookup(ENV_URI) {
            self.uri = uri;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.user = user;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = database;
        }
        self
    }
}

/// Client for Neo4j graph operations. Cloning shares the connection pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect and verify the store answers queries.
    ///
    /// neo4rs builds its pool lazily, so a `RETURN 1` ping forces the bolt
    /// handshake inside the configured timeout. Any failure here is
    /// [`GraphError::Unavailable`]; there is no internal retry.
    pub async fn connect(config: &GraphConfig) -> GraphResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Unavailable(format!("invalid connection settings: {}", e)))?;

        let handshake = async {
            let graph = Graph::connect(neo4j_config).await?;
            graph.run(Query::new("RETURN 1".to_string())).await?;
            Ok::<_, neo4rs::Error>(graph)
        };

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let graph = tokio::time::timeout(timeout, handshake)
            .await
            .map_err(|_| {
                GraphError::Unavailable(format!(
                    "{} did not answer within {}s",
                    config.uri, config.connect_timeout_secs
                ))
            })?
            .map_err(|e| GraphError::Unavailable(format!("{}: {}", config.uri, e)))?;

        info!(uri = %config.uri, database = %config.database, "Connected to graph store");
        Ok(Self { graph })
    }

    /// Release the connection pool.
    pub fn close(self) {
        drop(self.graph);
        info!("Graph store connection closed");
    }

    /// Execute a Cypher query that returns no results.
    pub async fn execute(&self, query: Query) -> GraphResult<()> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> GraphResult<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(query).await?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> GraphResult<Option<T>> {
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.get(field)?)),
            None => Ok(None),
        }
    }
}
