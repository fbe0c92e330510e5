//! Resource Registry - central registration of all resources.
//!
//! This module provides resource registration without modifying service.rs.
//! When adding a new resource:
//! 1. Create the resource file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_resources()`

use rmcp::model::{AnnotateAble, RawResource};

use super::definitions::{ExpenseWidgetResource, ResourceDefinition};
use super::service::ResourceEntry;

/// Helper function to create an annotated resource from a definition.
fn build_resource<R: ResourceDefinition>() -> ResourceEntry {
    let mut raw = RawResource::new(R::URI, R::NAME);
    raw.description = Some(R::DESCRIPTION.to_string());
    raw.mime_type = Some(R::MIME_TYPE.to_string());

    ResourceEntry {
        resource: raw.no_annotation(),
        content: R::content(),
    }
}

/// Get all registered resources as ResourceEntries.
///
/// This is the central place where all resources are registered.
/// When adding a new resource, add it here.
pub fn get_all_resources() -> Vec<ResourceEntry> {
    vec![build_resource::<ExpenseWidgetResource>()]
}

/// Get the list of all resource URIs.
pub fn resource_uris() -> Vec<&'static str> {
    vec![ExpenseWidgetResource::URI]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_resources() {
        let resources = get_all_resources();
        assert_eq!(resources.len(), 1);

        let widget = &resources[0].resource;
        assert_eq!(widget.raw.uri, "ui://widget/expense-tracker.html");
        assert_eq!(widget.raw.mime_type.as_deref(), Some("text/html+skybridge"));
        assert!(widget.raw.description.is_some());
    }

    #[test]
    fn test_resource_uris() {
        let uris = resource_uris();
        assert_eq!(uris, ["ui://widget/expense-tracker.html"]);
    }
}
