//! Translation between external records and storage form.

pub mod edge;
pub mod node;

pub use edge::StorageEdge;
pub use node::StorageNode;

/// Property holding the caller-assigned stable identity of a node.
pub const FRONTEND_ID: &str = "frontend_id";

/// Layout properties.
pub const POS_X: &str = "x";
pub const POS_Y: &str = "y";

/// Properties owned by the translator; attributes may not overwrite them.
pub const RESERVED_KEYS: &[&str] = &[FRONTEND_ID, POS_X, POS_Y];
