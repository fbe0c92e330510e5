//! Expense Server Library
//!
//! This crate provides a small expense-tracking service exposed through two
//! parallel protocols: a plain REST API and an MCP (Model Context Protocol)
//! tool-calling surface consumed by an embedded widget and by agent
//! clients. Both surfaces read and write one persisted expense collection.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling,
//!   the main server handler, and the transport layer
//! - **domains**: Business logic organized by bounded contexts
//!   - **expenses**: the record store and input validation
//!   - **tools**: MCP tools (`list_expenses`, `add_expense`)
//!   - **resources**: the embedded widget document resource
//!
//! # Example
//!
//! ```rust,no_run
//! use expense_mcp_server::core::{Config, ExpenseServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = ExpenseServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, ExpenseServer, Result};
