//! Resources domain module.
//!
//! Resources are read-only documents advertised to MCP clients. The only
//! resource this server exposes is the embedded expense widget document,
//! which both tools reference as their UI template.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual resource definitions (one file per resource)
//! - `registry.rs` - Central resource registration
//! - `service.rs` - Resource listing and reading
//! - `error.rs` - Resource-specific error types

pub mod definitions;
mod error;
mod registry;
mod service;

pub use error::ResourceError;
pub use registry::{get_all_resources, resource_uris};
pub use service::{ResourceContent, ResourceEntry, ResourceService};
