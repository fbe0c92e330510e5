//! HTTP transport implementation.
//!
//! The single listener serving both protocol surfaces: the plain REST API
//! (`GET /expenses`, `POST /expenses`) and the MCP endpoint. REST handlers
//! operate on a per-request store snapshot; requests on the MCP path are
//! dispatched to a per-request server+session pair (see `session.rs`).

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use super::{TransportError, TransportResult, config::HttpConfig, session};
use crate::core::config::Config;
use crate::core::server::ExpenseServer;
use crate::domains::expenses::{ExpenseRecord, ExpenseStore, validate_strict};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
///
/// Only the configuration is shared: REST handlers build a per-request
/// store, and the MCP endpoint builds a per-request server+session pair, so
/// concurrent requests share nothing but the store's backing file.
#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<Config>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the router with all REST and MCP routes.
    pub fn build_router(&self, config: Arc<Config>) -> Router {
        let state = AppState { config };

        let mut app = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/expenses", get(list_expenses).post(create_expense))
            .route(
                &self.config.rpc_path,
                get(session::handle_get)
                    .post(session::handle_post)
                    .delete(session::handle_delete),
            )
            .fallback(not_found)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        // Any origin may call both surfaces; preflight is answered by the
        // CORS layer without touching the store.
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: ExpenseServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.build_router(server.config().clone());

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (REST + MCP, CORS {})",
            addr, cors_status
        );
        info!("  → REST: GET/POST /expenses");
        info!("  → MCP:  {} (POST, GET, DELETE)", self.config.rpc_path);

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - plain-text liveness string.
async fn root_handler() -> &'static str {
    "Expense MCP server"
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// `GET /expenses` - reload and return the full collection.
async fn list_expenses(State(state): State<AppState>) -> Json<Vec<ExpenseRecord>> {
    let mut store = ExpenseStore::new(&state.config.store);
    store.load().await;
    Json(store.into_records())
}

/// `POST /expenses` - validate strictly, then append and persist.
///
/// Accepts only `{name, amount}` with a non-empty name and a finite amount;
/// anything else, including a body that fails to parse as JSON, gets the
/// uniform 400 reply. The created record is answered with 201 even if the
/// persist silently failed (the in-memory state stays authoritative).
async fn create_expense(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: serde_json::Value = if body.is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Rejected unparseable expense payload: {}", e);
                return invalid_payload();
            }
        }
    };

    let valid = match validate_strict(&payload) {
        Ok(valid) => valid,
        Err(e) => {
            debug!("Rejected expense payload: {}", e);
            return invalid_payload();
        }
    };

    let mut store = ExpenseStore::new(&state.config.store);
    store.load().await;

    let record = ExpenseRecord::new(valid.name, valid.amount);
    store.append(record.clone());
    store.persist().await;

    info!("Created expense {} ({})", record.id, record.name);

    (StatusCode::CREATED, Json(record)).into_response()
}

/// The uniform 400 reply for any invalid `POST /expenses` payload.
fn invalid_payload() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "Invalid expense payload" })),
    )
        .into_response()
}

/// Routing miss - 404, not logged as an error.
async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, header};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router(dir: &TempDir) -> Router {
        let mut config = Config::default();
        config.store.data_file = dir.path().join("expenses.json");
        config.resources.widget_file = dir.path().join("expense-widget.html");
        HttpTransport::new(HttpConfig::default()).build_router(Arc::new(config))
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_liveness() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Expense MCP server");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_get_expenses_empty() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, get("/expenses")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_post_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(
            &router,
            post_json("/expenses", r#"{"name":"Coffee","amount":4.5}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert!(created["id"].is_string());
        assert_eq!(created["name"], "Coffee");
        assert_eq!(created["amount"], 4.5);

        let response = send(&router, get("/expenses")).await;
        let list = body_json(response).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["name"], "Coffee");
        assert_eq!(list[0]["amount"], 4.5);
        assert_eq!(list[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_post_empty_name_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, post_json("/expenses", r#"{"name":"","amount":3}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Invalid expense payload"})
        );

        // Store unchanged.
        let response = send(&router, get("/expenses")).await;
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_post_non_numeric_amount_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(
            &router,
            post_json("/expenses", r#"{"name":"Coffee","amount":"lots"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_malformed_body_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, post_json("/expenses", "{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Invalid expense payload"})
        );
    }

    #[tokio::test]
    async fn test_unknown_route_404() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, get("/unknown")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/expenses")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = send(&router, request).await;

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_mcp_bare_get_usage_hint() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, get("/mcp")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains("Expense MCP endpoint"));
    }

    #[tokio::test]
    async fn test_mcp_get_event_stream() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder()
            .method("GET")
            .uri("/mcp")
            .header(header::ACCEPT, "text/event-stream")
            .body(Body::empty())
            .unwrap();
        let response = send(&router, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(
            content_type
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );
    }

    #[tokio::test]
    async fn test_mcp_get_json_only_not_acceptable() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder()
            .method("GET")
            .uri("/mcp")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();
        let response = send(&router, request).await;

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn test_mcp_delete_acknowledged() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder()
            .method("DELETE")
            .uri("/mcp")
            .body(Body::empty())
            .unwrap();
        let response = send(&router, request).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mcp_initialize_over_http() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(
            &router,
            post_json(
                "/mcp",
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn test_mcp_add_visible_via_rest() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(
            &router,
            post_json(
                "/mcp",
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"add_expense","arguments":{"name":"Bus","amount":2.25}}}"#,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["result"]["structuredContent"]["expenses"][0]["name"],
            "Bus"
        );

        // The same record is visible on the REST surface.
        let response = send(&router, get("/expenses")).await;
        let list = body_json(response).await;
        assert_eq!(list[0]["name"], "Bus");
        assert_eq!(list[0]["amount"], 2.25);
    }

    #[tokio::test]
    async fn test_mcp_notification_accepted() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(
            &router,
            post_json(
                "/mcp",
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_mcp_parse_error() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = send(&router, post_json("/mcp", "{broken")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32700);
    }
}
