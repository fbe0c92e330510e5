//! Expense widget resource definition.
//!
//! The widget is a pre-rendered HTML document produced by an external asset
//! pipeline; this server serves it verbatim under a fixed logical URI.

use super::ResourceDefinition;
use crate::domains::resources::service::ResourceContent;

/// The embedded expense widget document.
pub struct ExpenseWidgetResource;

impl ExpenseWidgetResource {
    /// Meta hints attached to the widget contents on the HTTP read path.
    #[cfg(feature = "http")]
    pub fn read_meta() -> serde_json::Value {
        serde_json::json!({ "openai/widgetPrefersBorder": true })
    }
}

impl ResourceDefinition for ExpenseWidgetResource {
    const URI: &'static str = "ui://widget/expense-tracker.html";
    const NAME: &'static str = "expense-widget";
    const DESCRIPTION: &'static str = "Pre-rendered HTML document for the embedded expense widget";
    const MIME_TYPE: &'static str = "text/html+skybridge";

    fn content() -> ResourceContent {
        ResourceContent::WidgetDocument
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_metadata() {
        assert_eq!(ExpenseWidgetResource::URI, "ui://widget/expense-tracker.html");
        assert_eq!(ExpenseWidgetResource::MIME_TYPE, "text/html+skybridge");
    }

    #[test]
    fn test_widget_content_is_document() {
        assert!(matches!(
            ExpenseWidgetResource::content(),
            ResourceContent::WidgetDocument
        ));
    }
}
