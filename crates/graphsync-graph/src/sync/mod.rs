//! Node-link payload to property graph synchronization.
//!
//! Ingests whole payloads in overwrite or merge mode and rebuilds the
//! external node-link shape from the stored graph. Record-level problems are
//! reported, never raised: a batch always runs to the end.
//!
//! The synchronizer does not serialize concurrent calls. An overwrite racing
//! a read can observe a partially rebuilt graph; callers that need
//! consistency run a single writer.

pub mod report;


use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use graphsync_core::translate::{self, edge, node, FRONTEND_ID};
use graphsync_core::{codec, ExternalEdge, ExternalNode, GraphSnapshot, NodeDetail, RecordError};

use crate::error::{GraphError, GraphResult};
use crate::schema;
use crate::store::{GraphCounts, GraphStore, StoredEdge, StoredNode, WriteOutcome};

pub use report::{IngestReport, ItemCounts, ItemKind, SkipReason, SkippedItem};

/// Properties holding JSON documents, decoded strictly for the detail view.
pub const JSON_DETAIL_FIELDS: &[&str] = &["rawJsonData", "details"];

/// How an ingested payload relates to the graph already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Replace the stored graph with the payload.
    #[default]
    Overwrite,
    /// Upsert the payload into the stored graph.
    Merge,
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestMode::Overwrite => write!(f, "overwrite"),
            IngestMode::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for IngestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            other => Err(format!("unknown ingest mode '{}' (expected overwrite or merge)", other)),
        }
    }
}

/// Orchestrates ingestion and retrieval over an injected [`GraphStore`].
#[derive(Clone)]
pub struct Synchronizer {
    store: Arc<dyn GraphStore>,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Ingest a whole node-link payload.
    ///
    /// Overwrite mode clears the graph and its indices first; both modes then
    /// ensure identity indices, write every node, then every edge. Only a
    /// malformed envelope or a failure to clear or index aborts the call.
    pub async fn ingest(&self, payload: &Value, mode: IngestMode) -> GraphResult<IngestReport> {
        let (raw_nodes, raw_edges) = split_payload(payload)?;
        info!(%mode, nodes = raw_nodes.len(), edges = raw_edges.len(), "Starting ingestion");

        let parsed: Vec<Result<ExternalNode, RecordError>> =
            raw_nodes.iter().map(ExternalNode::try_from).collect();
        let storage: Vec<Result<translate::StorageNode, RecordError>> = parsed
            .into_iter()
            .map(|record| record.map(|n| node::to_storage(&n)))
            .collect();
        let labels: BTreeSet<String> = storage
            .iter()
            .filter_map(|record| record.as_ref().ok())
            .map(|n| n.label.clone())
            .collect();

        if mode == IngestMode::Overwrite {
            self.store.clear_all().await?;
        }
        schema::ensure_indices(self.store.as_ref(), &labels).await?;

        let mut report = IngestReport::new(mode);
        report.nodes.attempted = storage.len();
        report.edges.attempted = raw_edges.len();

        // frontend_id -> label of every node written, for indexed endpoint lookups.
        let mut written_labels: HashMap<String, String> = HashMap::new();
        let mut seen = BTreeSet::new();
        for (index, record) in storage.into_iter().enumerate() {
            let stored = match record {
                Ok(stored) => stored,
                Err(err) => {
                    warn!(index, error = %err, "Skipping invalid node record");
                    let id = raw_nodes[index].get("id").map(id_hint);
                    report.skip(ItemKind::Node, index, id, SkipReason::Malformed(err.to_string()));
                    continue;
                }
            };

            if !seen.insert(stored.frontend_id.clone()) {
                let err = RecordError::DuplicateId(stored.frontend_id.clone());
                warn!(index, error = %err, "Skipping repeated node record");
                report.skip(ItemKind::Node, index, Some(stored.frontend_id), SkipReason::Malformed(err.to_string()));
                continue;
            }

            let written = match mode {
                IngestMode::Overwrite => self.store.create_node(&stored).await.map(|()| WriteOutcome::Created),
                IngestMode::Merge => self.store.upsert_node(&stored).await,
            };
            match written {
                Ok(outcome) => {
                    debug!(node_id = %stored.frontend_id, label = %stored.label, ?outcome, "Wrote node");
                    report.written(ItemKind::Node, outcome);
                    written_labels.insert(stored.frontend_id, stored.label);
                }
                Err(err) => {
                    warn!(node_id = %stored.frontend_id, error = %err, "Node write failed");
                    report.skip(ItemKind::Node, index, Some(stored.frontend_id), SkipReason::WriteFailed(err.to_string()));
                }
            }
        }

        for (index, raw) in raw_edges.iter().enumerate() {
            let external = match ExternalEdge::try_from(raw) {
                Ok(external) => external,
                Err(err) => {
                    warn!(index, error = %err, "Skipping invalid edge record");
                    report.skip(ItemKind::Edge, index, None, SkipReason::Malformed(err.to_string()));
                    continue;
                }
            };
            let mut stored = edge::to_storage(&external);
            stored.source_label = written_labels.get(&stored.source).cloned();
            stored.target_label = written_labels.get(&stored.target).cloned();
            let edge_id = Some(format!("{}->{}", stored.source, stored.target));

            let written = match mode {
                IngestMode::Overwrite => self.store.create_edge(&stored).await,
                IngestMode::Merge => self.store.merge_edge(&stored).await,
            };
            match written {
                Ok(Some(outcome)) => {
                    debug!(source = %stored.source, target = %stored.target, rel = %stored.rel_type, ?outcome, "Wrote edge");
                    report.written(ItemKind::Edge, outcome);
                }
                Ok(None) => {
                    debug!(source = %stored.source, target = %stored.target, "Edge endpoint not found");
                    report.skip(ItemKind::Edge, index, edge_id, SkipReason::UnresolvedEndpoint);
                }
                Err(err) => {
                    warn!(source = %stored.source, target = %stored.target, error = %err, "Edge write failed");
                    report.skip(ItemKind::Edge, index, edge_id, SkipReason::WriteFailed(err.to_string()));
                }
            }
        }

        info!(
            %mode,
            nodes_created = report.nodes.created,
            nodes_merged = report.nodes.merged,
            nodes_skipped = report.nodes.skipped,
            edges_created = report.edges.created,
            edges_merged = report.edges.merged,
            edges_skipped = report.edges.skipped,
            "Ingestion complete"
        );
        Ok(report)
    }

    /// The whole stored graph in external shape.
    ///
    /// Degrades to an empty snapshot when the store cannot be read.
    pub async fn retrieve_all(&self) -> GraphSnapshot {
        match self.try_retrieve_all().await {
            Ok(snapshot) => {
                info!(nodes = snapshot.nodes.len(), edges = snapshot.edges.len(), "Retrieved graph");
                snapshot
            }
            Err(err) => {
                warn!(error = %err, "Graph read failed, returning empty graph");
                GraphSnapshot::default()
            }
        }
    }

    async fn try_retrieve_all(&self) -> GraphResult<GraphSnapshot> {
        let nodes = self
            .store
            .fetch_nodes()
            .await?
            .iter()
            .filter_map(|stored| node::to_external(&stored.labels, &stored.properties))
            .collect();

        let edges = self
            .store
            .fetch_edges()
            .await?
            .into_iter()
            .filter_map(|stored| {
                let StoredEdge { rel_id, rel_type, source, target, properties } = stored;
                let (Some(source), Some(target)) = (source, target) else {
                    debug!(rel_id = %rel_id, "Dropping edge with unresolved endpoint");
                    return None;
                };
                Some(edge::to_external(&rel_type, properties, &source, &target, &rel_id))
            })
            .collect();

        Ok(GraphSnapshot { nodes, edges })
    }

    /// Detach-delete one node. `Ok(false)` when it was already absent.
    pub async fn delete_node(&self, id: &str) -> GraphResult<bool> {
        let deleted = self.store.delete_node(id).await?;
        info!(node_id = id, deleted, "Delete node");
        Ok(deleted)
    }

    /// Labels and decoded properties of one node, `None` when absent.
    pub async fn get_node_detail(&self, id: &str) -> GraphResult<Option<NodeDetail>> {
        Ok(self.store.fetch_node(id).await?.map(|stored| node_detail(id, stored)))
    }

    /// Node and relationship counts.
    pub async fn status(&self) -> GraphResult<GraphCounts> {
        self.store.counts().await
    }
}

/// The `nodes` and `edges` arrays of a payload; absent arrays are empty.
fn split_payload(payload: &Value) -> GraphResult<(&[Value], &[Value])> {
    let envelope = payload
        .as_object()
        .ok_or_else(|| GraphError::malformed("payload must be a JSON object"))?;
    Ok((payload_array(envelope, "nodes")?, payload_array(envelope, "edges")?))
}

fn payload_array<'a>(envelope: &'a Map<String, Value>, key: &str) -> GraphResult<&'a [Value]> {
    match envelope.get(key) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(GraphError::malformed(format!("'{}' must be an array", key))),
    }
}

/// Best-effort id of a rejected node record, for the report.
fn id_hint(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn node_detail(id: &str, stored: StoredNode) -> NodeDetail {
    let properties: Map<String, Value> = stored
        .properties
        .into_iter()
        .map(|(key, value)| {
            let decoded = if key == FRONTEND_ID {
                value
            } else if JSON_DETAIL_FIELDS.contains(&key.as_str()) {
                codec::decode_json_field(&value)
            } else {
                codec::decode(&value)
            };
            (key, decoded)
        })
        .collect();

    NodeDetail {
        id: id.to_string(),
        labels: stored.labels,
        properties,
    }
}
