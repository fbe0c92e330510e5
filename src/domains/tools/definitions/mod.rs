//! Tool definitions module.
//!
//! Each tool is defined in its own file with:
//! - Parameters struct (for the input schema)
//! - `execute()` method (core logic)
//! - `http_handler()` method (called via ToolRegistry for the HTTP path)
//!
//! Both tools reply in the same shape the widget consumes: an optional
//! human-readable message plus the full collection as structured payload.

use rmcp::model::{CallToolResult, Content};

use crate::domains::expenses::ExpenseRecord;

mod add_expense;
mod list_expenses;

pub use add_expense::AddExpenseTool;
pub use list_expenses::ListExpensesTool;

/// Build the shared tool reply: an optional human-readable message plus the
/// full current collection as structured payload.
pub(crate) fn expenses_reply(records: &[ExpenseRecord], message: Option<String>) -> CallToolResult {
    let content = match message {
        Some(text) => vec![Content::text(text)],
        None => Vec::new(),
    };

    CallToolResult {
        content,
        structured_content: Some(serde_json::json!({ "expenses": records })),
        is_error: Some(false),
        meta: None,
    }
}

/// Render a tool result as the raw JSON the HTTP dispatch path returns,
/// attaching the widget template association.
#[cfg(feature = "http")]
pub(crate) fn call_result_json(
    result: CallToolResult,
    ui_meta: serde_json::Value,
) -> serde_json::Value {
    let mut response = serde_json::json!({
        "content": result.content,
        "isError": result.is_error.unwrap_or(false)
    });

    let object = response.as_object_mut().unwrap();
    if let Some(structured) = result.structured_content {
        object.insert("structuredContent".to_string(), structured);
    }
    object.insert("_meta".to_string(), ui_meta);

    response
}
