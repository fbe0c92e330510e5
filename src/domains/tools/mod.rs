//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! The server exposes exactly two tools over the session transport:
//! `list_expenses` and `add_expense`. Both read and write through the
//! expense store and advertise the widget resource as their UI template.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - ToolRouter builder for the rmcp-native transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//! - `error.rs` - Tool-specific error types

pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;
