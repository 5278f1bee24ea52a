//! Graph store gateway.
//!
//! [`GraphStore`] is the only way the synchronizer touches persisted state.
//! [`GraphClient`](crate::GraphClient) implements it over Neo4j;
//! [`MemoryStore`] keeps the graph in process.

pub mod memory;
pub mod neo4j;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use graphsync_core::{StorageEdge, StorageNode};

use crate::error::GraphResult;

pub use memory::MemoryStore;

/// A stored vertex as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
}

/// A stored relationship with its endpoints' `frontend_id`s, when present.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEdge {
    pub rel_id: String,
    pub rel_type: String,
    pub source: Option<String>,
    pub target: Option<String>,
    pub properties: Map<String, Value>,
}

/// Whether a write produced a new element or updated one already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Merged,
}

/// Node and relationship counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Operations the synchronizer needs from a persisted property graph.
///
/// Labels and relationship types passed in are interpolated into query
/// text by implementations and must be sanitized there; every property
/// value travels as a parameter.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Remove every node, relationship and `frontend_id` index.
    async fn clear_all(&self) -> GraphResult<()>;

    /// Create the `frontend_id` lookup index for `label`.
    ///
    /// May fail with [`GraphError::AlreadyExists`](crate::GraphError::AlreadyExists).
    async fn ensure_index(&self, label: &str) -> GraphResult<()>;

    /// Create a new vertex.
    async fn create_node(&self, node: &StorageNode) -> GraphResult<()>;

    /// Create the vertex, or update the one with the same `frontend_id` in
    /// place. An existing vertex under another label is relabeled, so
    /// `frontend_id` stays unique.
    async fn upsert_node(&self, node: &StorageNode) -> GraphResult<WriteOutcome>;

    /// Create a relationship between the vertices whose `frontend_id`s are
    /// `edge.source` and `edge.target`, looked up under the endpoint labels
    /// when the edge carries them. `Ok(None)` when an endpoint does not
    /// resolve.
    async fn create_edge(&self, edge: &StorageEdge) -> GraphResult<Option<WriteOutcome>>;

    /// Like [`create_edge`](Self::create_edge), but reuses an existing
    /// relationship of the same type between the same endpoints and reports
    /// [`WriteOutcome::Merged`] for it.
    async fn merge_edge(&self, edge: &StorageEdge) -> GraphResult<Option<WriteOutcome>>;

    async fn fetch_nodes(&self) -> GraphResult<Vec<StoredNode>>;

    async fn fetch_edges(&self) -> GraphResult<Vec<StoredEdge>>;

    async fn fetch_node(&self, frontend_id: &str) -> GraphResult<Option<StoredNode>>;

    /// Detach-delete the vertex with `frontend_id`. `Ok(false)` when absent.
    async fn delete_node(&self, frontend_id: &str) -> GraphResult<bool>;

    async fn counts(&self) -> GraphResult<GraphCounts>;
}
