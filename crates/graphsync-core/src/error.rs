//! Record-level error types.

use thiserror::Error;

/// Why a single node or edge record of a payload was rejected.
///
/// These never abort a batch: the synchronizer records them in its report
/// and moves on to the next record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("node record has no usable id")]
    MissingId,

    #[error("edge record has no usable {0}")]
    MissingEndpoint(&'static str),

    #[error("attributes must be a JSON object")]
    AttributesNotMapping,

    #[error("duplicate node id '{0}' in payload")]
    DuplicateId(String),
}

/// Result type for record parsing.
pub type RecordResult<T> = Result<T, RecordError>;
