//! Identity index on `frontend_id`.
//!
//! There is no identity table outside the store: edge endpoints and detail
//! lookups resolve by `frontend_id` equality, backed by one lookup index per
//! vertex label.

use std::collections::BTreeSet;

use tracing::{debug, info};

use graphsync_core::model::DEFAULT_NODE_LABEL;

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

/// Labels indexed regardless of payload content.
pub const DEFAULT_INDEXED_LABELS: &[&str] = &["person", "company", DEFAULT_NODE_LABEL];

/// Name of the `frontend_id` index for `label`.
pub fn index_name(label: &str) -> String {
    format!("fid_{}", label)
}

/// Ensure a `frontend_id` index exists for each default label and each of
/// `labels`.
///
/// Safe to run multiple times: "already exists" answers are swallowed, any
/// other store error is returned.
pub async fn ensure_indices<S>(store: &S, labels: &BTreeSet<String>) -> GraphResult<()>
where
    S: GraphStore + ?Sized,
{
    let wanted: BTreeSet<&str> = DEFAULT_INDEXED_LABELS
        .iter()
        .copied()
        .chain(labels.iter().map(String::as_str))
        .collect();

    for label in &wanted {
        match store.ensure_index(label).await {
            Ok(()) => debug!(label, "Ensured frontend_id index"),
            Err(GraphError::AlreadyExists(_)) => debug!(label, "frontend_id index already exists"),
            Err(e) => return Err(e),
        }
    }

    info!(labels = wanted.len(), "Identity indices ready");
    Ok(())
}
