//! Whole-graph route handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use graphsync_core::GraphSnapshot;
use graphsync_graph::store::GraphCounts;
use graphsync_graph::{IngestMode, IngestReport};

use super::error_response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IngestParams {
    #[serde(default)]
    pub mode: IngestMode,
}

pub async fn ingest_graph(
    State(state): State<AppState>,
    Query(params): Query<IngestParams>,
    Json(payload): Json<Value>,
) -> Result<Json<IngestReport>, (StatusCode, String)> {
    let report = state.sync.ingest(&payload, params.mode).await
        .map_err(error_response)?;

    Ok(Json(report))
}

pub async fn get_graph(State(state): State<AppState>) -> Json<GraphSnapshot> {
    Json(state.sync.retrieve_all().await)
}

pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<GraphCounts>, (StatusCode, String)> {
    let counts = state.sync.status().await
        .map_err(error_response)?;

    Ok(Json(counts))
}
