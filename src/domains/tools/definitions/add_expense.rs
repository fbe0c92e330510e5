//! Add expense tool definition.
//!
//! Validates the input strictly, then appends and persists. A rejected
//! payload is answered with a human-readable message and the collection
//! unchanged, so the widget re-renders with the state it last knew.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::expenses_reply;
use crate::core::config::Config;
use crate::domains::expenses::{ExpenseRecord, ExpenseStore, validate_strict};
use crate::domains::resources::definitions::{ExpenseWidgetResource, ResourceDefinition};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the add expense tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddExpenseParams {
    /// Label for the expense. Must be non-empty.
    pub name: String,

    /// Amount spent. Must be a finite number.
    pub amount: f64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Add expense tool - appends a new expense item with a name and amount.
pub struct AddExpenseTool;

impl AddExpenseTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "add_expense";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Adds a new expense item with a name and amount.";

    /// Execute the tool logic.
    ///
    /// Arguments are validated as raw JSON rather than deserialized into
    /// [`AddExpenseParams`] so that a malformed payload produces the
    /// rejection reply instead of a protocol error.
    #[instrument(skip_all)]
    pub async fn execute(arguments: &JsonObject, config: &Config) -> CallToolResult {
        let raw = serde_json::Value::Object(arguments.clone());

        let valid = match validate_strict(&raw) {
            Ok(valid) => valid,
            Err(e) => {
                info!("Rejected expense input: {}", e);
                let mut store = ExpenseStore::new(&config.store);
                store.load().await;
                return expenses_reply(store.records(), Some(format!("Invalid expense: {}", e)));
            }
        };

        let mut store = ExpenseStore::new(&config.store);
        store.load().await;

        let record = ExpenseRecord::new(valid.name, valid.amount);
        store.append(record.clone());
        store.persist().await;

        info!("Added expense {} ({})", record.id, record.name);

        expenses_reply(
            store.records(),
            Some(format!(
                "Added \"{}\" for ${:.2}.",
                record.name, record.amount
            )),
        )
    }

    /// Widget template association advertised with this tool.
    #[cfg(feature = "http")]
    pub fn ui_meta() -> serde_json::Value {
        serde_json::json!({
            "openai/outputTemplate": ExpenseWidgetResource::URI,
            "openai/toolInvocation/invoking": "Saving expense",
            "openai/toolInvocation/invoked": "Saved expense"
        })
    }

    /// HTTP handler for this tool (for the HTTP dispatch path).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        config: Arc<Config>,
    ) -> Result<serde_json::Value, super::super::ToolError> {
        let args = match arguments {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => JsonObject::new(),
            _ => {
                return Err(super::super::ToolError::invalid_arguments(
                    "Tool arguments must be an object",
                ));
            }
        };

        let result = Self::execute(&args, &config).await;
        Ok(super::call_result_json(result, Self::ui_meta()))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<AddExpenseParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Add expense".to_string()),
        }
    }

    /// Create a ToolRoute for the rmcp-native transport.
    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let config = config.clone();
            async move { Ok(Self::execute(&args, &config).await) }.boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
