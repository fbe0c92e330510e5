//! Transport layer for the expense server.
//!
//! This module provides the transport implementations:
//! - **HTTP**: the single listener serving the REST API and the MCP
//!   endpoint - feature: `http`
//! - **STDIO**: standard input/output MCP mode for local agent clients -
//!   feature: `stdio`
//!
//! The HTTP transport routes each request either to a REST handler or to a
//! per-request MCP session; the session module owns the protocol framing
//! and lifecycle for the MCP endpoint.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub mod session;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

// Re-export configs for convenience
#[cfg(feature = "http")]
pub use config::HttpConfig;
