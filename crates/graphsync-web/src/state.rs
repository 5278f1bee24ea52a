//! Application state.

use std::sync::Arc;

use graphsync_graph::Synchronizer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<Synchronizer>,
}

impl AppState {
    pub fn new(sync: Synchronizer) -> Self {
        Self { sync: Arc::new(sync) }
    }
}
