//! Route handlers.

pub mod graph;
pub mod nodes;

use axum::http::StatusCode;
use graphsync_graph::GraphError;

/// Map a graph error to a transport status.
pub(crate) fn error_response(err: GraphError) -> (StatusCode, String) {
    let status = match &err {
        GraphError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        GraphError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GraphError::Unavailable(_) | GraphError::Query(_) | GraphError::AlreadyExists(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, err.to_string())
}
