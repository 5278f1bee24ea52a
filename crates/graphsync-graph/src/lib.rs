//! # Graphsync Graph
//!
//! Keeps an external node-link graph in step with a persisted Neo4j
//! property graph.
//!
//! Provides the store gateway (Neo4j and in-memory), the `frontend_id`
//! identity index, and the synchronizer that ingests payloads and rebuilds
//! the external shape on read.

pub mod client;
pub mod error;
pub mod schema;
pub mod store;
pub mod sync;

pub use client::{GraphClient, GraphConfig};
pub use error::{GraphError, GraphResult};
pub use store::{GraphCounts, GraphStore, MemoryStore, StoredEdge, StoredNode, WriteOutcome};
pub use sync::{IngestMode, IngestReport, Synchronizer};
