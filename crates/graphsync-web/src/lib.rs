//! Graphsync Web Server
//!
//! Axum router exposing the synchronizer over HTTP. Callers are assumed to
//! be authorized before they reach these routes.

pub mod routes;
pub mod state;

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use graphsync_graph::Synchronizer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/graph", post(routes::graph::ingest_graph).get(routes::graph::get_graph))
        .route("/nodes/{id}", get(routes::nodes::get_node).delete(routes::nodes::delete_node))
        .route("/status", get(routes::graph::get_status))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Run the web server until `shutdown` resolves.
pub async fn run_server(
    sync: Synchronizer,
    host: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(AppState::new(sync));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use graphsync_graph::MemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn app(store: Arc<MemoryStore>) -> Router {
        create_router(AppState::new(Synchronizer::new(store)))
    }

    fn post_graph(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty(method: Method, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn payload() -> Value {
        json!({
            "nodes": [
                {"id": "n1", "type": "person", "attributes": {"name": "Alice"}},
                {"id": "n2", "type": "company", "attributes": {"name": "Acme"}}
            ],
            "edges": [{"source": "n1", "target": "n2", "relationLabel": "works_at"}]
        })
    }

    #[tokio::test]
    async fn test_ingest_then_read() {
        let store = Arc::new(MemoryStore::new());

        let response = app(store.clone())
            .oneshot(post_graph("/api/graph?mode=merge", payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = json_body(response).await;
        assert_eq!(report["mode"], "merge");
        assert_eq!(report["nodes"]["created"], 2);

        let response = app(store).oneshot(empty(Method::GET, "/api/graph")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let graph = json_body(response).await;
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(graph["edges"][0]["label"], "WORKS_AT");
        assert_eq!(graph["nodes"][0]["data"]["name"], "Alice");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_bad_request() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(post_graph("/api/graph", json!({"nodes": "nope"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_service_unavailable() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);

        let response = app(store.clone())
            .oneshot(post_graph("/api/graph", payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        // Reads degrade instead of failing.
        let response = app(store).oneshot(empty(Method::GET, "/api/graph")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"nodes": [], "edges": []}));
    }

    #[tokio::test]
    async fn test_node_detail_and_delete() {
        let store = Arc::new(MemoryStore::new());
        app(store.clone()).oneshot(post_graph("/api/graph", payload())).await.unwrap();

        let response = app(store.clone()).oneshot(empty(Method::GET, "/api/nodes/n1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["labels"], json!(["person"]));

        let response = app(store.clone()).oneshot(empty(Method::DELETE, "/api/nodes/n1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app(store.clone()).oneshot(empty(Method::DELETE, "/api/nodes/n1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(store).oneshot(empty(Method::GET, "/api/nodes/n1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_server_releases_store_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let sync = Synchronizer::new(store.clone());
        assert_eq!(Arc::strong_count(&store), 2);

        run_server(sync, "127.0.0.1", 0, async {}).await.unwrap();
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let store = Arc::new(MemoryStore::new());
        app(store.clone()).oneshot(post_graph("/api/graph", payload())).await.unwrap();

        let response = app(store).oneshot(empty(Method::GET, "/api/status")).await.unwrap();
        assert_eq!(json_body(response).await, json!({"nodes": 2, "relationships": 1}));
    }
}
