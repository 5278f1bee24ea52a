//! Graphsync Core Library
//!
//! Pure mapping logic between the external node-link graph representation
//! and the flat property maps persisted in the graph store. Nothing in this
//! crate performs I/O.

pub mod codec;
pub mod error;
pub mod model;
pub mod sanitize;
pub mod translate;

pub use codec::StoredValue;
pub use error::{RecordError, RecordResult};
pub use model::{DisplayEdge, ExternalEdge, ExternalNode, GraphSnapshot, NodeDetail, Position};
pub use translate::{StorageEdge, StorageNode};
