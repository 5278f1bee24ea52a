//! Single-node route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use graphsync_core::NodeDetail;

use super::error_response;
use crate::state::AppState;

pub async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NodeDetail>, (StatusCode, String)> {
    let detail = state.sync.get_node_detail(&id).await
        .map_err(error_response)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Node not found: {}", id)))?;

    Ok(Json(detail))
}

pub async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.sync.delete_node(&id).await
        .map_err(error_response)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Node not found: {}", id)))
    }
}
