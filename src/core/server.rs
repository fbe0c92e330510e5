//! Expense server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the domain services.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (for the input schema)
//! - `execute()` method (core logic)
//! - `http_handler()` method (called via ToolRegistry for the HTTP path)
//!
//! The ToolRouter is built dynamically in `domains/tools/router.rs`.
//!
//! The server is cheap to construct: the HTTP transport builds a fresh
//! instance for every MCP request so concurrent sessions share nothing but
//! the store's backing file.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::{resources::ResourceService, tools::build_tool_router};

#[cfg(feature = "http")]
use crate::domains::resources::ResourceError;
#[cfg(feature = "http")]
use crate::domains::resources::definitions::{ExpenseWidgetResource, ResourceDefinition};
#[cfg(feature = "http")]
use crate::domains::tools::{ToolError, ToolRegistry};

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and
/// coordinates between the domain services to handle MCP protocol messages.
#[derive(Clone)]
pub struct ExpenseServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Service for handling resource-related requests.
    resource_service: Arc<ResourceService>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl ExpenseServer {
    /// Instructions reported to clients on initialize.
    pub const INSTRUCTIONS: &'static str = "Expense tracking server. Use list_expenses to read \
         the collection and add_expense to record a new expense.";

    /// Create a new expense server with the given configuration.
    pub fn new(config: Config) -> Self {
        Self::from_shared_config(Arc::new(config))
    }

    /// Create a server from an already shared configuration.
    ///
    /// The HTTP transport builds a fresh server per MCP request, so
    /// construction only wires the domain services together.
    pub fn from_shared_config(config: Arc<Config>) -> Self {
        let resource_service = Arc::new(ResourceService::new(config.resources.clone()));

        Self {
            tool_router: build_tool_router::<Self>(config.clone()),
            config,
            resource_service,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    // ========================================================================
    // HTTP Dispatch Support Methods
    // ========================================================================

    /// List all available tools (for the HTTP dispatch path).
    ///
    /// Each entry carries the widget template association in `_meta` so the
    /// embedding host knows which UI renders the tool results.
    #[cfg(feature = "http")]
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                let ui_meta = ToolRegistry::ui_meta(t.name.as_ref());
                let mut tool = serde_json::json!({
                    "name": t.name,
                    "title": t.title,
                    "description": t.description,
                    "inputSchema": t.input_schema
                });
                if let Some(meta) = ui_meta {
                    tool.as_object_mut()
                        .unwrap()
                        .insert("_meta".to_string(), meta);
                }
                tool
            })
            .collect()
    }

    /// Call a tool by name (for the HTTP dispatch path).
    ///
    /// This method uses the ToolRegistry to dispatch to the appropriate
    /// tool handler. Each tool's http_handler is defined in its own file
    /// under `domains/tools/definitions/`.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let registry = ToolRegistry::new(self.config.clone());
        registry.call_tool(name, arguments).await
    }

    /// List all available resources (for the HTTP dispatch path).
    #[cfg(feature = "http")]
    pub async fn list_resources(&self) -> Vec<serde_json::Value> {
        let resources = self.resource_service.list_resources().await;

        resources
            .into_iter()
            .map(|r| {
                serde_json::json!({
                    "uri": r.raw.uri,
                    "name": r.raw.name,
                    "description": r.raw.description,
                    "mimeType": r.raw.mime_type
                })
            })
            .collect()
    }

    /// Read a resource by URI (for the HTTP dispatch path).
    #[cfg(feature = "http")]
    pub async fn read_resource(&self, uri: &str) -> Result<serde_json::Value, ResourceError> {
        let result = self.resource_service.read_resource(uri).await?;
        let mut contents = serde_json::to_value(&result.contents)
            .map_err(|e| ResourceError::internal(e.to_string()))?;

        // The widget read carries presentation hints for the embedding host.
        if uri == ExpenseWidgetResource::URI {
            if let Some(items) = contents.as_array_mut() {
                for item in items.iter_mut() {
                    if let Some(object) = item.as_object_mut() {
                        object.insert("_meta".to_string(), ExpenseWidgetResource::read_meta());
                    }
                }
            }
        }

        Ok(serde_json::json!({ "contents": contents }))
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool
/// routing.
#[tool_handler]
impl ServerHandler for ExpenseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(Self::INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        info!("Listing resources");
        let resources = self.resource_service.list_resources().await;
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        self.resource_service
            .read_resource(&request.uri)
            .await
            .map_err(|e| McpError::resource_not_found(e.to_string(), None))
    }
}
