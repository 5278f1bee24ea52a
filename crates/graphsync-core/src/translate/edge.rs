//! Edge translator.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::codec::{self, StoredValue};
use crate::model::{DisplayEdge, ExternalEdge, MarkerEnd};
use crate::sanitize;

/// Canvas edge style emitted on read.
pub const EDGE_STYLE: &str = "smoothstep";

/// Canvas arrow marker emitted on read.
pub const EDGE_MARKER: &str = "arrowclosed";

/// An edge ready to be written between two `frontend_id`s.
///
/// `source_label` and `target_label` name the endpoint vertices' labels when
/// the caller knows them, so the store can resolve endpoints through the
/// label's identity index.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEdge {
    pub source: String,
    pub target: String,
    pub rel_type: String,
    pub properties: BTreeMap<String, StoredValue>,
    pub source_label: Option<String>,
    pub target_label: Option<String>,
}

/// Map an external edge to a relationship type and scalar properties.
pub fn to_storage(edge: &ExternalEdge) -> StorageEdge {
    let properties = edge
        .attributes
        .iter()
        .filter_map(|(raw_key, value)| {
            let Some(key) = sanitize::property_key(raw_key) else {
                warn!(source = %edge.source, target = %edge.target, key = %raw_key, "Dropping edge attribute with unsafe key");
                return None;
            };
            let stored = codec::encode_scalar(value);
            if stored.is_none() {
                debug!(source = %edge.source, target = %edge.target, key, "Omitting non-scalar edge attribute");
            }
            Some((key.to_string(), stored?))
        })
        .collect();

    StorageEdge {
        source: edge.source.clone(),
        target: edge.target.clone(),
        rel_type: sanitize::relation_type(&edge.relation_label),
        properties,
        source_label: None,
        target_label: None,
    }
}

/// Build the external edge for a stored relationship. Properties are passed
/// through untouched.
pub fn to_external(
    rel_type: &str,
    properties: Map<String, Value>,
    source: &str,
    target: &str,
    rel_id: &str,
) -> DisplayEdge {
    DisplayEdge {
        id: format!("edge-{}-{}-{}", rel_id, source, target),
        source: source.to_string(),
        target: target.to_string(),
        label: rel_type.to_string(),
        data: properties,
        edge_type: EDGE_STYLE.to_string(),
        marker_end: MarkerEnd {
            marker_type: EDGE_MARKER.to_string(),
        },
    }
}
