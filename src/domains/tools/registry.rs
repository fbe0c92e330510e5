//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when the http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use super::definitions::{AddExpenseTool, ListExpensesTool};
#[cfg(feature = "http")]
use super::error::ToolError;
use crate::core::config::Config;

/// Tool registry - manages all available tools.
///
/// This struct provides a central point for:
/// - Listing all available tools
/// - Dispatching HTTP tool calls (when the http feature is enabled)
pub struct ToolRegistry {
    config: Arc<Config>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![ListExpensesTool::NAME, AddExpenseTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools. Both
    /// transports use this to get tool metadata.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![AddExpenseTool::to_tool(), ListExpensesTool::to_tool()]
    }

    /// Widget template association for a tool, by name.
    #[cfg(feature = "http")]
    pub fn ui_meta(name: &str) -> Option<serde_json::Value> {
        match name {
            ListExpensesTool::NAME => Some(ListExpensesTool::ui_meta()),
            AddExpenseTool::NAME => Some(AddExpenseTool::ui_meta()),
            _ => None,
        }
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    ///
    /// This is used by the HTTP dispatch path to call tools.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            ListExpensesTool::NAME => {
                ListExpensesTool::http_handler(arguments, self.config.clone()).await
            }
            AddExpenseTool::NAME => {
                AddExpenseTool::http_handler(arguments, self.config.clone()).await
            }
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Arc<Config> {
        let mut config = Config::default();
        config.store.data_file = dir.path().join("expenses.json");
        config.resources.widget_file = dir.path().join("expense-widget.html");
        Arc::new(config)
    }

    #[test]
    fn test_registry_tool_names() {
        let dir = TempDir::new().unwrap();
        let registry = ToolRegistry::new(test_config(&dir));
        let names = registry.tool_names();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"list_expenses"));
        assert!(names.contains(&"add_expense"));
    }

    #[test]
    fn test_get_all_tools_matches_names() {
        let tools = ToolRegistry::get_all_tools();
        assert_eq!(tools.len(), 2);
        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"list_expenses"));
        assert!(names.contains(&"add_expense"));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_ui_meta_known_and_unknown() {
        assert!(ToolRegistry::ui_meta("list_expenses").is_some());
        assert!(ToolRegistry::ui_meta("add_expense").is_some());
        assert!(ToolRegistry::ui_meta("delete_expense").is_none());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_list() {
        let dir = TempDir::new().unwrap();
        let registry = ToolRegistry::new(test_config(&dir));
        let result = registry
            .call_tool("list_expenses", serde_json::json!({}))
            .await;
        assert!(result.is_ok());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_unknown() {
        let dir = TempDir::new().unwrap();
        let registry = ToolRegistry::new(test_config(&dir));
        let result = registry.call_tool("unknown", serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }
}
