//! JSON renderer for the traversal protocol.

use crate::export::ExportError;
use crate::export::tree::ObjectTreeBuilder;
use crate::export::writer::{ObjectNotationRenderer, ObjectNotationWriter};
use tracing::debug;

/// Renders one document instance as pretty-printed JSON.
///
/// Elements become objects, attributes become string entries, associations
/// become named arrays. JSON has no comment syntax, so comment events are
/// dropped.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::{JsonRenderer, ObjectNotationRenderer, walk_document};
/// use dataset_export_sdk::models::Element;
///
/// let root = Element::root("Customer")
///     .with_attributes(&["id"], &["1"])
///     .unwrap();
/// let mut renderer = JsonRenderer::new();
/// walk_document(&root, &mut renderer).unwrap();
/// let json = renderer.finish().unwrap();
/// assert!(json.contains("\"id\": \"1\""));
/// ```
pub struct JsonRenderer {
    tree: ObjectTreeBuilder,
}

impl JsonRenderer {
    /// Create a renderer with an empty output document.
    pub fn new() -> Self {
        Self {
            tree: ObjectTreeBuilder::new(),
        }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectNotationWriter for JsonRenderer {
    fn element_start(
        &mut self,
        name: &str,
        _is_root: bool,
        attr_names: &[&str],
        attr_values: &[&str],
    ) -> Result<(), ExportError> {
        self.tree.element_start(name, attr_names, attr_values)
    }

    fn element_end(&mut self, name: &str, _is_root: bool) -> Result<(), ExportError> {
        self.tree.element_end(name)
    }

    fn text(&mut self, content: &str) -> Result<(), ExportError> {
        self.tree.text(content)
    }

    fn association_start(
        &mut self,
        association_name: &str,
        _element_name: &str,
    ) -> Result<(), ExportError> {
        self.tree.association_start(association_name)
    }

    fn association_end(&mut self, association_name: &str) -> Result<(), ExportError> {
        self.tree.association_end(association_name)
    }

    fn comment(&mut self, _text: &str) -> Result<(), ExportError> {
        debug!("JSON has no comment syntax, dropping annotation");
        Ok(())
    }
}

impl ObjectNotationRenderer for JsonRenderer {
    fn finish(&mut self) -> Result<String, ExportError> {
        let document = self.tree.take_root()?;
        serde_json::to_string_pretty(&document)
            .map_err(|e| ExportError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::walk_document;
    use crate::models::{Association, Element};

    #[test]
    fn test_renders_root_object_keyed_by_element_name() {
        let root = Element::root("Customer")
            .with_attributes(&["id", "name"], &["1", "Ada"])
            .unwrap();
        let mut renderer = JsonRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&renderer.finish().unwrap()).unwrap();
        assert_eq!(value["Customer"]["id"], "1");
        assert_eq!(value["Customer"]["name"], "Ada");
    }

    #[test]
    fn test_renders_association_as_array_field() {
        let mut root = Element::root("Customer")
            .with_attributes(&["id"], &["1"])
            .unwrap();
        let mut orders = Association::new("orders", "Order");
        orders.push(Element::new("Order").with_attributes(&["id"], &["7"]).unwrap());
        root.push_association(orders);

        let mut renderer = JsonRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&renderer.finish().unwrap()).unwrap();
        assert_eq!(value["Customer"]["orders"][0]["id"], "7");
    }

    #[test]
    fn test_comments_are_dropped() {
        let mut root = Element::root("Customer");
        root.push_comment("invisible");
        let mut renderer = JsonRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let json = renderer.finish().unwrap();
        assert!(!json.contains("invisible"));
    }

    #[test]
    fn test_finish_before_completion_fails() {
        let mut renderer = JsonRenderer::new();
        renderer.element_start("Customer", true, &[], &[]).unwrap();
        assert!(renderer.finish().is_err());
    }
}
