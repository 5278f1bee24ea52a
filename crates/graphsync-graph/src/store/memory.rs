//! In-process implementation of [`GraphStore`].
//!
//! Mirrors the semantics of the Neo4j gateway closely enough to exercise the
//! synchronizer without a server, and backs `--dry-run` ingestion. Index
//! creation behaves like a store without `IF NOT EXISTS`: a second attempt
//! answers [`GraphError::AlreadyExists`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use graphsync_core::sanitize;
use graphsync_core::translate::FRONTEND_ID;
use graphsync_core::{StorageEdge, StorageNode, StoredValue};

use super::{GraphCounts, GraphStore, StoredEdge, StoredNode, WriteOutcome};
use crate::error::{GraphError, GraphResult};
use crate::schema::index_name;

#[derive(Debug, Clone)]
struct MemoryNode {
    labels: Vec<String>,
    properties: Map<String, Value>,
}

#[derive(Debug, Clone)]
struct MemoryEdge {
    rel_type: String,
    source: u64,
    target: u64,
    properties: Map<String, Value>,
}

#[derive(Debug, Default)]
struct MemoryGraph {
    next_id: u64,
    nodes: BTreeMap<u64, MemoryNode>,
    edges: BTreeMap<u64, MemoryEdge>,
    indexes: BTreeSet<String>,
}

impl MemoryGraph {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// First vertex carrying `frontend_id`, like the gateway's `LIMIT 1`.
    fn resolve(&self, frontend_id: &str) -> Option<u64> {
        self.resolve_labeled(frontend_id, None)
    }

    /// Like [`resolve`](Self::resolve), restricted to vertices carrying
    /// `label` when one is given.
    fn resolve_labeled(&self, frontend_id: &str, label: Option<&str>) -> Option<u64> {
        let label = label.map(sanitize::node_label);
        self.nodes
            .iter()
            .find(|(_, node)| {
                node.properties.get(FRONTEND_ID).and_then(Value::as_str) == Some(frontend_id)
                    && label.as_ref().map_or(true, |l| node.labels.contains(l))
            })
            .map(|(id, _)| *id)
    }

    fn frontend_id(&self, id: u64) -> Option<String> {
        self.nodes
            .get(&id)?
            .properties
            .get(FRONTEND_ID)?
            .as_str()
            .map(str::to_string)
    }
}

fn json_props(properties: &BTreeMap<String, StoredValue>) -> Map<String, Value> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

/// In-memory property graph.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<MemoryGraph>,
    unavailable: AtomicBool,
    failing_labels: std::sync::RwLock<HashSet<String>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with [`GraphError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make node writes with `label` fail with [`GraphError::Query`].
    pub fn fail_writes_for_label(&self, label: &str) {
        if let Ok(mut labels) = self.failing_labels.write() {
            labels.insert(label.to_string());
        }
    }

    /// Names of the identity indexes currently present, sorted.
    pub async fn index_names(&self) -> Vec<String> {
        self.graph.read().await.indexes.iter().cloned().collect()
    }

    fn check_available(&self) -> GraphResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(GraphError::Unavailable("memory store switched off".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self, label: &str) -> GraphResult<()> {
        self.check_available()?;
        let failing = self
            .failing_labels
            .read()
            .map(|labels| labels.contains(label))
            .unwrap_or(false);
        if failing {
            return Err(GraphError::Query(format!("write rejected for label {}", label)));
        }
        Ok(())
    }

    async fn write_edge(&self, edge: &StorageEdge, merge: bool) -> GraphResult<Option<WriteOutcome>> {
        self.check_available()?;
        let rel_type = sanitize::relation_type(&edge.rel_type);
        let mut graph = self.graph.write().await;

        let source = graph.resolve_labeled(&edge.source, edge.source_label.as_deref());
        let target = graph.resolve_labeled(&edge.target, edge.target_label.as_deref());
        let (Some(source), Some(target)) = (source, target) else {
            return Ok(None);
        };
        let properties = json_props(&edge.properties);

        if merge {
            let existing = graph
                .edges
                .values_mut()
                .find(|e| e.source == source && e.target == target && e.rel_type == rel_type);
            if let Some(existing) = existing {
                existing.properties.extend(properties);
                return Ok(Some(WriteOutcome::Merged));
            }
        }

        let id = graph.allocate();
        graph.edges.insert(id, MemoryEdge { rel_type, source, target, properties });
        Ok(Some(WriteOutcome::Created))
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn clear_all(&self) -> GraphResult<()> {
        self.check_available()?;
        let mut graph = self.graph.write().await;
        graph.nodes.clear();
        graph.edges.clear();
        graph.indexes.clear();
        Ok(())
    }

    async fn ensure_index(&self, label: &str) -> GraphResult<()> {
        self.check_available()?;
        let name = index_name(&sanitize::node_label(label));
        let mut graph = self.graph.write().await;
        if graph.indexes.insert(name.clone()) {
            Ok(())
        } else {
            Err(GraphError::AlreadyExists(format!("index {} already exists", name)))
        }
    }

    async fn create_node(&self, node: &StorageNode) -> GraphResult<()> {
        let label = sanitize::node_label(&node.label);
        self.check_writable(&label)?;
        let mut graph = self.graph.write().await;
        let id = graph.allocate();
        graph.nodes.insert(
            id,
            MemoryNode {
                labels: vec![label],
                properties: json_props(&node.properties),
            },
        );
        Ok(())
    }

    async fn upsert_node(&self, node: &StorageNode) -> GraphResult<WriteOutcome> {
        let label = sanitize::node_label(&node.label);
        self.check_writable(&label)?;
        let mut graph = self.graph.write().await;

        let existing = graph.resolve(&node.frontend_id);
        if let Some(existing) = existing.and_then(|id| graph.nodes.get_mut(&id)) {
            existing.labels = vec![label];
            existing.properties.extend(json_props(&node.properties));
            return Ok(WriteOutcome::Merged);
        }

        let id = graph.allocate();
        graph.nodes.insert(
            id,
            MemoryNode {
                labels: vec![label],
                properties: json_props(&node.properties),
            },
        );
        Ok(WriteOutcome::Created)
    }

    async fn create_edge(&self, edge: &StorageEdge) -> GraphResult<Option<WriteOutcome>> {
        self.write_edge(edge, false).await
    }

    async fn merge_edge(&self, edge: &StorageEdge) -> GraphResult<Option<WriteOutcome>> {
        self.write_edge(edge, true).await
    }

    async fn fetch_nodes(&self) -> GraphResult<Vec<StoredNode>> {
        self.check_available()?;
        let graph = self.graph.read().await;
        Ok(graph
            .nodes
            .values()
            .map(|node| StoredNode {
                labels: node.labels.clone(),
                properties: node.properties.clone(),
            })
            .collect())
    }

    async fn fetch_edges(&self) -> GraphResult<Vec<StoredEdge>> {
        self.check_available()?;
        let graph = self.graph.read().await;
        Ok(graph
            .edges
            .iter()
            .map(|(id, edge)| StoredEdge {
                rel_id: id.to_string(),
                rel_type: edge.rel_type.clone(),
                source: graph.frontend_id(edge.source),
                target: graph.frontend_id(edge.target),
                properties: edge.properties.clone(),
            })
            .collect())
    }

    async fn fetch_node(&self, frontend_id: &str) -> GraphResult<Option<StoredNode>> {
        self.check_available()?;
        let graph = self.graph.read().await;
        Ok(graph.resolve(frontend_id).and_then(|id| graph.nodes.get(&id)).map(|node| StoredNode {
            labels: node.labels.clone(),
            properties: node.properties.clone(),
        }))
    }

    async fn delete_node(&self, frontend_id: &str) -> GraphResult<bool> {
        self.check_available()?;
        let mut graph = self.graph.write().await;

        let doomed: HashSet<u64> = graph
            .nodes
            .iter()
            .filter(|(_, node)| node.properties.get(FRONTEND_ID).and_then(Value::as_str) == Some(frontend_id))
            .map(|(id, _)| *id)
            .collect();
        if doomed.is_empty() {
            return Ok(false);
        }

        graph.nodes.retain(|id, _| !doomed.contains(id));
        graph
            .edges
            .retain(|_, edge| !doomed.contains(&edge.source) && !doomed.contains(&edge.target));
        Ok(true)
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        self.check_available()?;
        let graph = self.graph.read().await;
        Ok(GraphCounts {
            nodes: graph.nodes.len(),
            relationships: graph.edges.len(),
        })
    }
}
