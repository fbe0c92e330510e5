//! List expenses tool definition.
//!
//! Returns the full expense collection. The store is reloaded first so the
//! reply reflects current on-disk state.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::expenses_reply;
use crate::core::config::Config;
use crate::domains::expenses::ExpenseStore;
use crate::domains::resources::definitions::{ExpenseWidgetResource, ResourceDefinition};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the list expenses tool (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListExpensesParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// List expenses tool - returns the full list of expenses.
pub struct ListExpensesTool;

impl ListExpensesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "list_expenses";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Returns the full list of expenses.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(config: &Config) -> CallToolResult {
        info!("Listing expenses");

        let mut store = ExpenseStore::new(&config.store);
        store.load().await;

        expenses_reply(store.records(), None)
    }

    /// Widget template association advertised with this tool.
    #[cfg(feature = "http")]
    pub fn ui_meta() -> serde_json::Value {
        serde_json::json!({
            "openai/outputTemplate": ExpenseWidgetResource::URI,
            "openai/toolInvocation/invoking": "Loading expenses",
            "openai/toolInvocation/invoked": "Loaded expenses"
        })
    }

    /// HTTP handler for this tool (for the HTTP dispatch path).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        _arguments: serde_json::Value,
        config: Arc<Config>,
    ) -> Result<serde_json::Value, super::super::ToolError> {
        let result = Self::execute(&config).await;
        Ok(super::call_result_json(result, Self::ui_meta()))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ListExpensesParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("List expenses".to_string()),
        }
    }

    /// Create a ToolRoute for the rmcp-native transport.
    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |_ctx: ToolCallContext<'_, S>| {
            let config = config.clone();
            async move { Ok(Self::execute(&config).await) }.boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
