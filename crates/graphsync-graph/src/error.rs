//! Graph layer error types.

use thiserror::Error;

/// Graph store and synchronization errors.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Graph query failed: {0}")]
    Query(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Create a malformed payload error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Whether the store itself could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<neo4rs::Error> for GraphError {
    fn from(err: neo4rs::Error) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<neo4rs::DeError> for GraphError {
    fn from(err: neo4rs::DeError) -> Self {
        Self::Query(format!("unexpected row shape: {}", err))
    }
}
