//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! This module builds the ToolRouter for the rmcp-native transport by
//! delegating to the tool definitions themselves. Each tool knows how to
//! create its own route.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{AddExpenseTool, ListExpensesTool};
use crate::core::config::Config;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(config: Arc<Config>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(AddExpenseTool::create_route(config.clone()))
        .with_route(ListExpensesTool::create_route(config))
}
