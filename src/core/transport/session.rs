//! Per-request MCP session handling.
//!
//! Every request on the MCP endpoint gets an isolated protocol-server +
//! transport framing pair scoped to that single request - there is no
//! session reuse and no session id. The session owns a freshly constructed
//! [`ExpenseServer`] and the JSON-RPC framing over the HTTP body; dropping
//! it is the teardown, which runs on every exit path including a client
//! disconnect that aborts the handling future or drops the event stream.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::Stream;
use http::{HeaderMap, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::http::AppState;
use crate::core::config::Config;
use crate::core::error::Error;
use crate::core::server::ExpenseServer;
use crate::domains::expenses::ExpenseStore;
use crate::domains::tools::ToolError;

/// MCP protocol version reported by initialize.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Plain-text usage hint for clients probing the endpoint with a browser.
const USAGE_HINT: &str =
    "Expense MCP endpoint. Use an MCP client or send Accept: text/event-stream.";

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, -32700, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

// ============================================================================
// Session
// ============================================================================

/// A fresh protocol-server + transport framing pair scoped to one request.
pub struct McpSession {
    server: ExpenseServer,
}

impl McpSession {
    /// Build the pair for one request.
    ///
    /// The store is reloaded before the server is connected to the framing,
    /// so every tool invocation in this request sees current on-disk state
    /// (and the data file is initialized on first contact).
    pub async fn connect(config: Arc<Config>) -> Self {
        let mut store = ExpenseStore::new(&config.store);
        store.load().await;

        let server = ExpenseServer::from_shared_config(config);
        debug!("MCP session opened");
        Self { server }
    }

    /// Process a JSON-RPC request and return the response.
    pub async fn process_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::invalid_request(request.id);
        }

        match request.method.as_str() {
            // Initialize the MCP session
            "initialize" => self.handle_initialize(request),

            // Liveness probe
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),

            // List available tools
            "tools/list" => self.handle_tools_list(request),

            // Call a tool
            "tools/call" => self.handle_tools_call(request).await,

            // List available resources
            "resources/list" => self.handle_resources_list(request).await,

            // Read a resource
            "resources/read" => self.handle_resources_read(request).await,

            // Notifications that arrive with an id still get an empty success
            method if method.starts_with("notifications/") => {
                debug!("Received notification: {}", method);
                JsonRpcResponse::success(request.id, serde_json::Value::Null)
            }

            // Unknown method
            _ => {
                warn!("Unknown method: {}", request.method);
                JsonRpcResponse::method_not_found(request.id)
            }
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("Processing initialize request");

        let result = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": self.server.name(),
                "version": self.server.version()
            },
            "instructions": ExpenseServer::INSTRUCTIONS
        });

        JsonRpcResponse::success(request.id, result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("Processing tools/list request");

        let tools = self.server.list_tools();
        JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("Processing tools/call request");

        let params = match request.params {
            Some(p) => p,
            None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
        };

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match self.server.call_tool(&name, arguments).await {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e @ ToolError::NotFound(_)) | Err(e @ ToolError::InvalidArguments(_)) => {
                JsonRpcResponse::invalid_params(request.id, e.to_string())
            }
            Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        }
    }

    /// Handle resources/list request.
    async fn handle_resources_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("Processing resources/list request");

        let resources = self.server.list_resources().await;
        JsonRpcResponse::success(request.id, serde_json::json!({ "resources": resources }))
    }

    /// Handle resources/read request.
    async fn handle_resources_read(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("Processing resources/read request");

        let params = match request.params {
            Some(p) => p,
            None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
        };

        let uri = match params.get("uri").and_then(|v| v.as_str()) {
            Some(u) => u.to_string(),
            None => return JsonRpcResponse::invalid_params(request.id, "Missing resource URI"),
        };

        match self.server.read_resource(&uri).await {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => JsonRpcResponse::invalid_params(request.id, e.to_string()),
        }
    }
}

impl Drop for McpSession {
    fn drop(&mut self) {
        debug!("MCP session closed");
    }
}

// ============================================================================
// Axum handlers for the MCP endpoint
// ============================================================================

/// Handle `POST` on the MCP endpoint: one JSON-RPC message per request.
#[instrument(skip_all)]
pub async fn handle_post(State(state): State<AppState>, body: Bytes) -> Response {
    match try_handle_post(state, body).await {
        Ok(response) => response,
        Err(e) => {
            error!("Error handling MCP request: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

async fn try_handle_post(state: AppState, body: Bytes) -> Result<Response, Error> {
    let session = McpSession::connect(state.config.clone()).await;

    let message: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::parse_error(e.to_string())),
            )
                .into_response());
        }
    };

    // One message per POST; batch arrays are not part of this transport.
    if message.is_array() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(JsonRpcResponse::invalid_request(None)),
        )
            .into_response());
    }

    let request: JsonRpcRequest = match serde_json::from_value(message) {
        Ok(request) => request,
        Err(_) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::invalid_request(None)),
            )
                .into_response());
        }
    };

    info!("Received JSON-RPC request: {}", request.method);

    // Notifications get acknowledged without a response body.
    if request.id.is_none() && request.method.starts_with("notifications/") {
        debug!("Received notification: {}", request.method);
        return Ok(StatusCode::ACCEPTED.into_response());
    }

    let response = session.process_request(request).await;
    let body = serde_json::to_vec(&response)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Handle `GET` on the MCP endpoint.
///
/// A bare `GET` without an Accept header indicating streaming or JSON gets
/// a plain-text usage hint without engaging the transport. With
/// `text/event-stream` accepted, an SSE stream is opened and held until the
/// client disconnects.
pub async fn handle_get(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let wants_stream = accept.contains("text/event-stream");
    let wants_json = accept.contains("application/json");

    if !wants_stream && !wants_json {
        return (StatusCode::OK, USAGE_HINT).into_response();
    }

    if !wants_stream {
        // A JSON-only Accept cannot carry the streaming channel.
        return (
            StatusCode::NOT_ACCEPTABLE,
            Json(JsonRpcResponse::error(
                None,
                -32000,
                "The MCP event stream requires Accept: text/event-stream",
            )),
        )
            .into_response();
    }

    let session = McpSession::connect(state.config.clone()).await;
    info!("Opening MCP event stream");

    Sse::new(SessionStream::new(session))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Handle `DELETE` on the MCP endpoint.
///
/// The transport is sessionless, so there is nothing to terminate; the pair
/// is constructed, acknowledged, and immediately torn down.
pub async fn handle_delete(State(state): State<AppState>) -> Response {
    let _session = McpSession::connect(state.config.clone()).await;
    debug!("MCP session delete acknowledged");
    StatusCode::OK.into_response()
}

/// SSE body that owns its session, so the pair is torn down when the client
/// disconnects and the stream is dropped.
struct SessionStream {
    _session: McpSession,
}

impl SessionStream {
    fn new(session: McpSession) -> Self {
        Self { _session: session }
    }
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Sessionless transport: no server-initiated messages. The stream
        // stays open until the client disconnects.
        Poll::Pending
    }
}

// ============================================================================
// Tests
// ============================================================================
