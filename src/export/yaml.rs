//! YAML renderer for the traversal protocol.

use crate::export::ExportError;
use crate::export::tree::ObjectTreeBuilder;
use crate::export::writer::{ObjectNotationRenderer, ObjectNotationWriter};
use tracing::debug;

/// Renders one document instance as a YAML mapping.
///
/// Shares the object-tree assembly with the JSON renderer and serializes
/// the result through `serde_yaml`. Comment events are dropped: the
/// serializer owns the emitted text, so free-floating annotations have no
/// stable anchor in it.
pub struct YamlRenderer {
    tree: ObjectTreeBuilder,
}

impl YamlRenderer {
    /// Create a renderer with an empty output document.
    pub fn new() -> Self {
        Self {
            tree: ObjectTreeBuilder::new(),
        }
    }
}

impl Default for YamlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an assembled `serde_json::Value` tree to `serde_yaml::Value`.
fn json_to_yaml_value(json: &serde_json::Value) -> serde_yaml::Value {
    match json {
        serde_json::Value::Null => serde_yaml::Value::Null,
        serde_json::Value::Bool(b) => serde_yaml::Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(i))
            } else if let Some(f) = n.as_f64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(f))
            } else {
                serde_yaml::Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => serde_yaml::Value::String(s.clone()),
        serde_json::Value::Array(arr) => {
            serde_yaml::Value::Sequence(arr.iter().map(json_to_yaml_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in obj {
                map.insert(
                    serde_yaml::Value::String(k.clone()),
                    json_to_yaml_value(v),
                );
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

impl ObjectNotationWriter for YamlRenderer {
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
        debug!("dropping annotation from YAML output");
        Ok(())
    }
}

impl ObjectNotationRenderer for YamlRenderer {
    fn finish(&mut self) -> Result<String, ExportError> {
        let document = self.tree.take_root()?;
        serde_yaml::to_string(&json_to_yaml_value(&document))
            .map_err(|e| ExportError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::walk_document;
    use crate::models::{Association, Element};

    #[test]
    fn test_renders_mapping_with_attributes() {
        let root = Element::root("Customer")
            .with_attributes(&["id"], &["1"])
            .unwrap();
        let mut renderer = YamlRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let yaml = renderer.finish().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["Customer"]["id"], "1");
    }

    #[test]
    fn test_renders_association_as_sequence() {
        let mut root = Element::root("Customer");
        let mut orders = Association::new("orders", "Order");
        orders.push(Element::new("Order").with_attributes(&["id"], &["7"]).unwrap());
        root.push_association(orders);

        let mut renderer = YamlRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let value: serde_yaml::Value =
            serde_yaml::from_str(&renderer.finish().unwrap()).unwrap();
        assert_eq!(value["Customer"]["orders"][0]["id"], "7");
    }

    #[test]
    fn test_comments_are_dropped() {
        let mut root = Element::root("Customer");
        root.push_comment("invisible");
        let mut renderer = YamlRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let yaml = renderer.finish().unwrap();
        assert!(!yaml.contains("invisible"));
    }

    #[test]
    fn test_output_parses_back_as_yaml() {
        let mut root = Element::root("Customer");
        root.push_text("a note");
        let mut renderer = YamlRenderer::new();
        walk_document(&root, &mut renderer).unwrap();
        let yaml = renderer.finish().unwrap();
        assert!(serde_yaml::from_str::<serde_yaml::Value>(&yaml).is_ok());
    }
}
