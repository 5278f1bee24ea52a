//! Ingestion outcome reporting.

use serde::{Deserialize, Serialize};

use super::IngestMode;
use crate::store::WriteOutcome;

/// Tally for one record kind.
///
/// `merged` counts records folded into an element already stored, either by
/// an earlier merge or earlier in the same payload. Overwrite mode never
/// merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub attempted: usize,
    pub created: usize,
    #[serde(default)]
    pub merged: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Node,
    Edge,
}

/// Why a record did not make it into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Missing fields or wrong shapes.
    Malformed(String),
    /// The store refused the write.
    WriteFailed(String),
    /// An edge endpoint has no vertex with that `frontend_id`.
    UnresolvedEndpoint,
}

/// One skipped record; `index` is its position in the payload array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub kind: ItemKind,
    pub index: usize,
    pub id: Option<String>,
    pub reason: SkipReason,
}

/// Result of one payload ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub mode: IngestMode,
    pub nodes: ItemCounts,
    pub edges: ItemCounts,
    pub skipped: Vec<SkippedItem>,
}

impl IngestReport {
    pub(crate) fn new(mode: IngestMode) -> Self {
        Self {
            mode,
            nodes: ItemCounts::default(),
            edges: ItemCounts::default(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn written(&mut self, kind: ItemKind, outcome: WriteOutcome) {
        let counts = match kind {
            ItemKind::Node => &mut self.nodes,
            ItemKind::Edge => &mut self.edges,
        };
        match outcome {
            WriteOutcome::Created => counts.created += 1,
            WriteOutcome::Merged => counts.merged += 1,
        }
    }

    pub(crate) fn skip(&mut self, kind: ItemKind, index: usize, id: Option<String>, reason: SkipReason) {
        match kind {
            ItemKind::Node => self.nodes.skipped += 1,
            ItemKind::Edge => self.edges.skipped += 1,
        }
        self.skipped.push(SkippedItem { kind, index, id, reason });
    }

    /// Whether every record was written.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
