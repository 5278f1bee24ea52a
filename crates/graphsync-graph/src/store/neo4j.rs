//! [`GraphStore`] over Neo4j.
//!
//! Structural names are sanitized and back-tick quoted right before they are
//! spliced into Cypher; everything else is a `$param`.
//!
//! ```cypher
//! (:<label> {frontend_id, x, y, ...})-[:<REL_TYPE> {...}]->(:<label> {...})
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use neo4rs::{BoltType, Query};
use serde_json::{Map, Value};
use tracing::{debug, info};

use graphsync_core::sanitize::{self, quoted};
use graphsync_core::translate::FRONTEND_ID;
use graphsync_core::{StorageEdge, StorageNode, StoredValue};

use super::{GraphCounts, GraphStore, StoredEdge, StoredNode, WriteOutcome};
use crate::error::{GraphError, GraphResult};
use crate::schema::index_name;
use crate::GraphClient;

const CLEAR_GRAPH: &str = "MATCH (n) DETACH DELETE n";

const LIST_IDENTITY_INDEXES: &str = "SHOW INDEXES YIELD name, properties
     WHERE properties = ['frontend_id']
     RETURN name";

const LIST_IDENTITY_LABELS: &str = "SHOW INDEXES YIELD entityType, labelsOrTypes, properties
     WHERE entityType = 'NODE' AND properties = ['frontend_id']
     RETURN labelsOrTypes AS labels";

const FETCH_NODES: &str = "MATCH (n) RETURN labels(n) AS labels, properties(n) AS props";

const FETCH_EDGES: &str = "MATCH (s)-[r]->(t)
     RETURN elementId(r) AS rel_id, type(r) AS rel_type,
            s.frontend_id AS source, t.frontend_id AS target,
            properties(r) AS props";


fn index_cypher(label: &str) -> String {
    let label = sanitize::node_label(label);
    format!(
        "CREATE INDEX {} IF NOT EXISTS FOR (n:{}) ON (n.{})",
        quoted(&index_name(&label)),
        quoted(&label),
        FRONTEND_ID
    )
}

fn create_node_cypher(label: &str) -> String {
    format!("CREATE (n:{} $props)", quoted(&sanitize::node_label(label)))
}

fn upsert_node_cypher(label: &str) -> String {
    format!(
        "MERGE (n:{} {{frontend_id: $frontend_id}})
         SET n += $props",
        quoted(&sanitize::node_label(label))
    )
}

/// Move the vertex currently stored under `stored_labels` to `label` and
/// update its properties. Stored labels come back from the store and are
/// quoted as they are.
fn relabel_node_cypher(stored_labels: &[String], label: &str) -> String {
    let label = sanitize::node_label(label);
    let stale: Vec<String> = stored_labels
        .iter()
        .filter(|l| **l != label)
        .map(|l| quoted(l))
        .collect();

    let mut cypher = match stored_labels.first() {
        Some(first) => format!("MATCH (n:{} {{frontend_id: $frontend_id}})", quoted(first)),
        None => "MATCH (n {frontend_id: $frontend_id})".to_string(),
    };
    if !stale.is_empty() {
        cypher.push_str(&format!("\n         REMOVE n:{}", stale.join(":")));
    }
    cypher.push_str(&format!("\n         SET n:{}\n         SET n += $props", quoted(&label)));
    cypher
}

/// Bind `n` to the vertices with `$frontend_id`, probing each indexed label
/// so every probe is an index seek. Without identity indexes this falls back
/// to an unlabeled match.
fn lookup_cypher(indexed_labels: &[String]) -> String {
    let probe = |label: &String| format!("MATCH (n:{} {{frontend_id: $frontend_id}}) RETURN n", quoted(label));
    match indexed_labels {
        [] => "MATCH (n {frontend_id: $frontend_id})".to_string(),
        [label] => format!("MATCH (n:{} {{frontend_id: $frontend_id}})", quoted(label)),
        labels => {
            let probes: Vec<String> = labels.iter().map(probe).collect();
            format!("CALL {{\n  {}\n}}", probes.join("\n  UNION\n  "))
        }
    }
}

fn fetch_node_cypher(indexed_labels: &[String]) -> String {
    format!(
        "{}
         RETURN labels(n) AS labels, properties(n) AS props
         LIMIT 1",
        lookup_cypher(indexed_labels)
    )
}

fn delete_node_cypher(indexed_labels: &[String]) -> String {
    format!(
        "{}
         DETACH DELETE n
         RETURN count(*) AS deleted",
        lookup_cypher(indexed_labels)
    )
}

/// Match pattern for one edge endpoint; labeled when the label is known.
fn endpoint_pattern(var: &str, param: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!(
            "({}:{} {{frontend_id: ${}}})",
            var,
            quoted(&sanitize::node_label(label)),
            param
        ),
        None => format!("({} {{frontend_id: ${}}})", var, param),
    }
}

/// Endpoints resolve by `frontend_id`, first match wins. Returns one
/// `outcome` row, `merged` when the relationship already existed, and no
/// row when an endpoint is missing.
fn edge_cypher(edge: &StorageEdge, merge: bool) -> String {
    let rel = quoted(&sanitize::relation_type(&edge.rel_type));
    let source = endpoint_pattern("a", "source", edge.source_label.as_deref());
    let target = endpoint_pattern("b", "target", edge.target_label.as_deref());
    let write = if merge {
        format!(
            "OPTIONAL MATCH (a)-[prior:{rel}]->(b)
         WITH a, b, count(prior) AS existing
         MERGE (a)-[r:{rel}]->(b) SET r += $props
         RETURN CASE WHEN existing > 0 THEN 'merged' ELSE 'created' END AS outcome",
            rel = rel
        )
    } else {
        format!(
            "CREATE (a)-[r:{} $props]->(b)
         RETURN 'created' AS outcome",
            rel
        )
    };
    format!(
        "MATCH {} WITH a LIMIT 1
         MATCH {} WITH a, b LIMIT 1
         {}",
        source, target, write
    )
}

fn to_bolt(value: &StoredValue) -> BoltType {
    match value {
        StoredValue::Bool(b) => BoltType::from(*b),
        StoredValue::Int(i) => BoltType::from(*i),
        StoredValue::Float(f) => BoltType::from(*f),
        StoredValue::Str(s) => BoltType::from(s.as_str()),
    }
}

fn props_param(properties: &BTreeMap<String, StoredValue>) -> BoltType {
    let map: HashMap<String, BoltType> = properties
        .iter()
        .map(|(key, value)| (key.clone(), to_bolt(value)))
        .collect();
    BoltType::from(map)
}

fn stored_node(row: &neo4rs::Row) -> GraphResult<StoredNode> {
    let labels: Vec<String> = row.get("labels")?;
    let props: HashMap<String, Value> = row.get("props")?;
    Ok(StoredNode {
        labels,
        properties: props.into_iter().collect::<Map<String, Value>>(),
    })
}

impl GraphClient {
    /// Labels that carry a `frontend_id` index, sorted.
    async fn identity_labels(&self) -> GraphResult<Vec<String>> {
        let rows = self.query(Query::new(LIST_IDENTITY_LABELS.to_string())).await?;
        let mut labels = BTreeSet::new();
        for row in rows {
            let indexed: Vec<String> = row.get("labels")?;
            labels.extend(indexed);
        }
        Ok(labels.into_iter().collect())
    }

    async fn write_edge(&self, edge: &StorageEdge, merge: bool) -> GraphResult<Option<WriteOutcome>> {
        let query = Query::new(edge_cypher(edge, merge))
            .param("source", edge.source.as_str())
            .param("target", edge.target.as_str())
            .param("props", props_param(&edge.properties));

        let outcome: Option<String> = self.query_scalar(query, "outcome").await?;
        Ok(outcome.map(|outcome| match outcome.as_str() {
            "merged" => WriteOutcome::Merged,
            _ => WriteOutcome::Created,
        }))
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn clear_all(&self) -> GraphResult<()> {
        self.execute(Query::new(CLEAR_GRAPH.to_string())).await?;

        let rows = self.query(Query::new(LIST_IDENTITY_INDEXES.to_string())).await?;
        for row in rows {
            let name: String = row.get("name")?;
            self.execute(Query::new(format!("DROP INDEX {} IF EXISTS", quoted(&name))))
                .await?;
            debug!(index = %name, "Dropped identity index");
        }

        info!("Cleared stored graph");
        Ok(())
    }

    async fn ensure_index(&self, label: &str) -> GraphResult<()> {
        match self.execute(Query::new(index_cypher(label))).await {
            Ok(()) => Ok(()),
            // An equivalent index under another name is reported as an error.
            Err(GraphError::Query(msg)) if msg.to_lowercase().contains("already exists") => {
                Err(GraphError::AlreadyExists(msg))
            }
            Err(e) => Err(e),
        }
    }

    async fn create_node(&self, node: &StorageNode) -> GraphResult<()> {
        let query = Query::new(create_node_cypher(&node.label))
            .param("props", props_param(&node.properties));
        self.execute(query).await
    }

    async fn upsert_node(&self, node: &StorageNode) -> GraphResult<WriteOutcome> {
        let stored_labels = self.fetch_node(&node.frontend_id).await?.map(|stored| stored.labels);

        let (cypher, outcome) = match &stored_labels {
            Some(labels) => (relabel_node_cypher(labels, &node.label), WriteOutcome::Merged),
            None => (upsert_node_cypher(&node.label), WriteOutcome::Created),
        };
        if let Some(labels) = &stored_labels {
            debug!(node_id = %node.frontend_id, from = ?labels, to = %node.label, "Updating stored node");
        }

        let query = Query::new(cypher)
            .param("frontend_id", node.frontend_id.as_str())
            .param("props", props_param(&node.properties));
        self.execute(query).await?;
        Ok(outcome)
    }

    async fn create_edge(&self, edge: &StorageEdge) -> GraphResult<Option<WriteOutcome>> {
        self.write_edge(edge, false).await
    }

    async fn merge_edge(&self, edge: &StorageEdge) -> GraphResult<Option<WriteOutcome>> {
        self.write_edge(edge, true).await
    }

    async fn fetch_nodes(&self) -> GraphResult<Vec<StoredNode>> {
        let rows = self.query(Query::new(FETCH_NODES.to_string())).await?;
        rows.iter().map(stored_node).collect()
    }

    async fn fetch_edges(&self) -> GraphResult<Vec<StoredEdge>> {
        let rows = self.query(Query::new(FETCH_EDGES.to_string())).await?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let props: HashMap<String, Value> = row.get("props")?;
            edges.push(StoredEdge {
                rel_id: row.get("rel_id")?,
                rel_type: row.get("rel_type")?,
                source: row.get("source")?,
                target: row.get("target")?,
                properties: props.into_iter().collect(),
            });
        }
        Ok(edges)
    }

    async fn fetch_node(&self, frontend_id: &str) -> GraphResult<Option<StoredNode>> {
        let labels = self.identity_labels().await?;
        let query = Query::new(fetch_node_cypher(&labels)).param("frontend_id", frontend_id);
        let rows = self.query(query).await?;
        rows.first().map(stored_node).transpose()
    }

    async fn delete_node(&self, frontend_id: &str) -> GraphResult<bool> {
        let labels = self.identity_labels().await?;
        let query = Query::new(delete_node_cypher(&labels)).param("frontend_id", frontend_id);
        let deleted: i64 = self.query_scalar(query, "deleted").await?.unwrap_or(0);
        Ok(deleted > 0)
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        let node_query = Query::new("MATCH (n) RETURN count(n) as count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) as count".to_string());

        let node_count: i64 = self.query_scalar(node_query, "count").await?.unwrap_or(0);
        let rel_count: i64 = self.query_scalar(rel_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: node_count as usize,
            relationships: rel_count as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_cypher_is_quoted() {
        assert_eq!(
            index_cypher("person"),
            "CREATE INDEX `fid_person` IF NOT EXISTS FOR (n:`person`) ON (n.frontend_id)"
        );
    }

    #[test]
    fn test_labels_cannot_escape_quoting() {
        let cypher = create_node_cypher("x`) DETACH DELETE (m");
        assert_eq!(cypher, "CREATE (n:`x_DETACH_DELETE_m` $props)");
        assert!(upsert_node_cypher("").contains("(n:`UnknownNode` {frontend_id: $frontend_id})"));
    }

    fn storage_edge(rel_type: &str, source_label: Option<&str>, target_label: Option<&str>) -> StorageEdge {
        StorageEdge {
            source: "n1".to_string(),
            target: "n2".to_string(),
            rel_type: rel_type.to_string(),
            properties: BTreeMap::new(),
            source_label: source_label.map(str::to_string),
            target_label: target_label.map(str::to_string),
        }
    }

    #[test]
    fn test_edge_cypher_binds_values_as_params() {
        let create = edge_cypher(&storage_edge("works at", None, None), false);
        assert!(create.contains("CREATE (a)-[r:`WORKS_AT` $props]->(b)"));
        assert!(create.contains("MATCH (a {frontend_id: $source})"));
        assert!(create.contains("MATCH (b {frontend_id: $target})"));

        let merge = edge_cypher(&storage_edge("works_at", None, None), true);
        assert!(merge.contains("OPTIONAL MATCH (a)-[prior:`WORKS_AT`]->(b)"));
        assert!(merge.contains("MERGE (a)-[r:`WORKS_AT`]->(b) SET r += $props"));
        assert!(merge.contains("'merged'"));
    }

    #[test]
    fn test_edge_cypher_matches_endpoints_by_label() {
        let cypher = edge_cypher(&storage_edge("works_at", Some("person"), Some("big co")), false);
        assert!(cypher.contains("MATCH (a:`person` {frontend_id: $source}) WITH a LIMIT 1"));
        assert!(cypher.contains("MATCH (b:`big_co` {frontend_id: $target}) WITH a, b LIMIT 1"));

        let partial = edge_cypher(&storage_edge("works_at", Some("person"), None), true);
        assert!(partial.contains("MATCH (a:`person` {frontend_id: $source})"));
        assert!(partial.contains("MATCH (b {frontend_id: $target})"));
    }

    #[test]
    fn test_lookup_probes_each_indexed_label() {
        assert_eq!(lookup_cypher(&[]), "MATCH (n {frontend_id: $frontend_id})");
        assert_eq!(
            lookup_cypher(&["person".to_string()]),
            "MATCH (n:`person` {frontend_id: $frontend_id})"
        );

        let labels = vec!["company".to_string(), "person".to_string()];
        let lookup = lookup_cypher(&labels);
        assert!(lookup.starts_with("CALL {"));
        assert!(lookup.contains("MATCH (n:`company` {frontend_id: $frontend_id}) RETURN n\n  UNION\n  MATCH (n:`person`"));
        assert!(fetch_node_cypher(&labels).contains("RETURN labels(n) AS labels"));
        assert!(delete_node_cypher(&labels).contains("DETACH DELETE n"));
    }

    #[test]
    fn test_relabel_replaces_stale_labels() {
        let cypher = relabel_node_cypher(&["person".to_string()], "employee");
        assert_eq!(
            cypher,
            "MATCH (n:`person` {frontend_id: $frontend_id})\n         REMOVE n:`person`\n         SET n:`employee`\n         SET n += $props"
        );

        let same = relabel_node_cypher(&["person".to_string()], "person");
        assert!(!same.contains("REMOVE"));
        assert!(same.contains("SET n:`person`"));
    }
}
