//! Resource service implementation.
//!
//! The ResourceService manages resource discovery and access. It maintains
//! a registry of available resources and handles read requests.
//!
//! Resources are defined in `definitions/` and registered via `registry.rs`.
//! Adding a new resource does NOT require modifying this file.

use rmcp::model::{ReadResourceResult, Resource, ResourceContents};
use std::collections::HashMap;
use tracing::info;

use super::error::ResourceError;
use super::registry::get_all_resources;
use crate::core::config::ResourcesConfig;

/// Service for managing and accessing resources.
pub struct ResourceService {
    /// Configuration for the resources domain.
    config: ResourcesConfig,

    /// Registry of available resources.
    /// Key: resource URI, Value: resource metadata
    resources: HashMap<String, ResourceEntry>,
}

/// An entry in the resource registry.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// The resource metadata.
    pub resource: Resource,

    /// The content provider for this resource.
    pub content: ResourceContent,
}

/// Different types of resource content.
#[derive(Debug, Clone)]
pub enum ResourceContent {
    /// Static text content.
    Text(String),

    /// The widget document, read verbatim from the configured build
    /// artifact on every read.
    WidgetDocument,
}

impl ResourceService {
    /// Create a new ResourceService with the given configuration.
    pub fn new(config: ResourcesConfig) -> Self {
        let mut service = Self {
            config,
            resources: HashMap::new(),
        };

        service.register_from_registry();

        service
    }

    /// Register all resources from the registry.
    fn register_from_registry(&mut self) {
        for entry in get_all_resources() {
            self.register_resource(entry);
        }
    }

    /// Register a resource.
    pub fn register_resource(&mut self, entry: ResourceEntry) {
        info!("Registering resource: {}", entry.resource.raw.uri);
        self.resources
            .insert(entry.resource.raw.uri.to_string(), entry);
    }

    /// List all available resources.
    pub async fn list_resources(&self) -> Vec<Resource> {
        self.resources
            .values()
            .map(|entry| entry.resource.clone())
            .collect()
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let entry = self
            .resources
            .get(uri)
            .ok_or_else(|| ResourceError::not_found(uri))?;

        let content = match &entry.content {
            ResourceContent::Text(text) => ResourceContents::text(text, uri),
            ResourceContent::WidgetDocument => {
                let html = std::fs::read_to_string(&self.config.widget_file)?;
                ResourceContents::TextResourceContents {
                    uri: uri.to_string(),
                    mime_type: entry.resource.raw.mime_type.clone(),
                    text: html,
                    meta: None,
                }
            }
        };

        Ok(ReadResourceResult {
            contents: vec![content],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::resources::definitions::{ExpenseWidgetResource, ResourceDefinition};
    use tempfile::TempDir;

    fn service_with_widget(dir: &TempDir, html: &str) -> ResourceService {
        let widget_file = dir.path().join("expense-widget.html");
        std::fs::write(&widget_file, html).unwrap();
        ResourceService::new(ResourcesConfig { widget_file })
    }

    #[tokio::test]
    async fn test_service_lists_widget() {
        let dir = TempDir::new().unwrap();
        let service = service_with_widget(&dir, "<html></html>");

        let resources = service.list_resources().await;
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].raw.uri, ExpenseWidgetResource::URI);
    }

    #[tokio::test]
    async fn test_read_widget_serves_document_verbatim() {
        let dir = TempDir::new().unwrap();
        let service = service_with_widget(&dir, "<html><body>widget</body></html>");

        let result = service
            .read_resource(ExpenseWidgetResource::URI)
            .await
            .unwrap();
        assert_eq!(result.contents.len(), 1);
        match &result.contents[0] {
            ResourceContents::TextResourceContents {
                text, mime_type, ..
            } => {
                assert_eq!(text, "<html><body>widget</body></html>");
                assert_eq!(mime_type.as_deref(), Some("text/html+skybridge"));
            }
            other => panic!("Expected text contents, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_missing_widget_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let service = ResourceService::new(ResourcesConfig {
            widget_file: dir.path().join("missing.html"),
        });

        let result = service.read_resource(ExpenseWidgetResource::URI).await;
        assert!(matches!(result, Err(ResourceError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_nonexistent_resource() {
        let dir = TempDir::new().unwrap();
        let service = service_with_widget(&dir, "<html></html>");

        let result = service.read_resource("ui://widget/unknown.html").await;
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }
}
