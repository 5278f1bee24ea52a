//! External node-link records exchanged at the system boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RecordError, RecordResult};

/// Label used when a node record carries no usable `type`.
pub const DEFAULT_NODE_LABEL: &str = "UnknownNode";

/// Relationship type used when an edge record carries no usable label.
pub const DEFAULT_RELATION: &str = "RELATED_TO";

/// 2-D layout coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Read `{x, y}` from an untyped value. Missing or non-numeric
    /// coordinates become `0.0`.
    pub fn from_value(value: &Value) -> Self {
        let coordinate = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        Self {
            x: coordinate("x"),
            y: coordinate("y"),
        }
    }
}

/// A node as supplied by (and returned to) the graph canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    #[serde(rename = "data")]
    pub attributes: Map<String, Value>,
}

impl TryFrom<&Value> for ExternalNode {
    type Error = RecordError;

    fn try_from(value: &Value) -> RecordResult<Self> {
        let record = value.as_object().ok_or(RecordError::NotAnObject)?;
        let id = identity(record.get("id")).ok_or(RecordError::MissingId)?;

        Ok(Self {
            id,
            node_type: record
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            position: record.get("position").map(Position::from_value).unwrap_or_default(),
            attributes: attribute_map(record, "attributes")?,
        })
    }
}

/// An edge record as supplied by the graph canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "relationLabel")]
    pub relation_label: String,
    #[serde(rename = "data")]
    pub attributes: Map<String, Value>,
}

impl TryFrom<&Value> for ExternalEdge {
    type Error = RecordError;

    fn try_from(value: &Value) -> RecordResult<Self> {
        let record = value.as_object().ok_or(RecordError::NotAnObject)?;
        let source = identity(record.get("source")).ok_or(RecordError::MissingEndpoint("source"))?;
        let target = identity(record.get("target")).ok_or(RecordError::MissingEndpoint("target"))?;
        let relation_label = record
            .get("relationLabel")
            .or_else(|| record.get("label"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            source,
            target,
            relation_label,
            attributes: attribute_map(record, "attributes")?,
        })
    }
}

/// Arrow marker hint for the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerEnd {
    #[serde(rename = "type")]
    pub marker_type: String,
}

/// An edge as emitted on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub data: Map<String, Value>,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub marker_end: MarkerEnd,
}

/// The whole stored graph, translated back to the external shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<ExternalNode>,
    pub edges: Vec<DisplayEdge>,
}

/// Full property map and labels of one node, for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetail {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
}

/// Stable identity from an `id`/`source`/`target` field. Numbers are
/// accepted and stringified; blank strings are not an identity.
fn identity(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The attribute mapping of a record, read from `key` or its `data` alias.
fn attribute_map(record: &Map<String, Value>, key: &str) -> RecordResult<Map<String, Value>> {
    match record.get(key).or_else(|| record.get("data")) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(RecordError::AttributesNotMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_node() {
        let raw = json!({
            "id": "n1",
            "type": "person",
            "position": {"x": 10, "y": 20.5},
            "attributes": {"name": "Alice"}
        });
        let node = ExternalNode::try_from(&raw).unwrap();
        assert_eq!(node.id, "n1");
        assert_eq!(node.node_type, "person");
        assert_eq!(node.position, Position { x: 10.0, y: 20.5 });
        assert_eq!(node.attributes.get("name"), Some(&json!("Alice")));
    }

    #[test]
    fn test_parse_node_defaults_and_data_alias() {
        let raw = json!({"id": 7, "data": {"k": 1}, "position": {"x": "left"}});
        let node = ExternalNode::try_from(&raw).unwrap();
        assert_eq!(node.id, "7");
        assert_eq!(node.node_type, "");
        assert_eq!(node.position, Position::default());
        assert_eq!(node.attributes.get("k"), Some(&json!(1)));
    }

    #[test]
    fn test_parse_node_rejections() {
        assert_eq!(ExternalNode::try_from(&json!("n1")), Err(RecordError::NotAnObject));
        assert_eq!(ExternalNode::try_from(&json!({"type": "person"})), Err(RecordError::MissingId));
        assert_eq!(ExternalNode::try_from(&json!({"id": "  "})), Err(RecordError::MissingId));
        assert_eq!(
            ExternalNode::try_from(&json!({"id": "n1", "attributes": [1, 2]})),
            Err(RecordError::AttributesNotMapping)
        );
    }

    #[test]
    fn test_parse_edge_label_alias() {
        let raw = json!({"source": "a", "target": "b", "label": "knows"});
        let edge = ExternalEdge::try_from(&raw).unwrap();
        assert_eq!(edge.relation_label, "knows");
        assert!(edge.attributes.is_empty());

        let missing = json!({"source": "a"});
        assert_eq!(ExternalEdge::try_from(&missing), Err(RecordError::MissingEndpoint("target")));
    }

    #[test]
    fn test_display_edge_serializes_canvas_fields() {
        let edge = DisplayEdge {
            id: "edge-1".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            label: "KNOWS".to_string(),
            data: Map::new(),
            edge_type: "smoothstep".to_string(),
            marker_end: MarkerEnd { marker_type: "arrowclosed".to_string() },
        };
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["type"], "smoothstep");
        assert_eq!(value["markerEnd"]["type"], "arrowclosed");
    }
}
