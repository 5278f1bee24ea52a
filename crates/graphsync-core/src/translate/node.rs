//! Node translator.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{FRONTEND_ID, POS_X, POS_Y, RESERVED_KEYS};
use crate::codec::{self, StoredValue};
use crate::model::{ExternalNode, Position, DEFAULT_NODE_LABEL};
use crate::sanitize;

/// A node ready to be written: sanitized label plus flat property map.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageNode {
    pub frontend_id: String,
    pub label: String,
    pub properties: BTreeMap<String, StoredValue>,
}

/// Map an external node to its label and storable properties.
pub fn to_storage(node: &ExternalNode) -> StorageNode {
    let mut properties = BTreeMap::new();
    properties.insert(FRONTEND_ID.to_string(), StoredValue::Str(node.id.clone()));
    properties.insert(POS_X.to_string(), StoredValue::Float(node.position.x));
    properties.insert(POS_Y.to_string(), StoredValue::Float(node.position.y));

    for (raw_key, value) in &node.attributes {
        let Some(key) = sanitize::property_key(raw_key) else {
            warn!(node_id = %node.id, key = %raw_key, "Dropping attribute with unsafe key");
            continue;
        };
        if RESERVED_KEYS.contains(&key) {
            warn!(node_id = %node.id, key, "Dropping attribute that shadows a reserved property");
            continue;
        }
        match codec::encode(value) {
            Some(stored) => {
                properties.insert(key.to_string(), stored);
            }
            None => debug!(node_id = %node.id, key, "Omitting empty attribute"),
        }
    }

    StorageNode {
        frontend_id: node.id.clone(),
        label: sanitize::node_label(&node.node_type),
        properties,
    }
}

/// Rebuild an external node from stored labels and properties.
///
/// Returns `None` for nodes without `frontend_id`: their identity cannot be
/// resolved, so they are not exposed.
pub fn to_external(labels: &[String], properties: &Map<String, Value>) -> Option<ExternalNode> {
    let id = match properties.get(FRONTEND_ID)? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let attributes = properties
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), codec::decode(value)))
        .collect();

    Some(ExternalNode {
        id,
        node_type: labels
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_NODE_LABEL.to_string()),
        position: Position {
            x: coordinate(properties.get(POS_X)),
            y: coordinate(properties.get(POS_Y)),
        },
        attributes,
    })
}

/// Numeric coordinate, accepting numeric text; anything else is `0.0`.
fn coordinate(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
