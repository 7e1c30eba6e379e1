//! Shared object-tree assembly for the JSON and YAML renderers.

use crate::export::ExportError;
use crate::export::writer::ProtocolError;
use serde_json::map::Entry;
use serde_json::{Map, Value};

enum Frame {
    Element {
        name: String,
        map: Map<String, Value>,
        text: String,
    },
    Association {
        name: String,
        items: Vec<Value>,
    },
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Element { name, .. } => name,
            Frame::Association { name, .. } => name,
        }
    }
}

/// Folds the event stream into a `serde_json::Value`.
///
/// Elements become objects keyed by element name at the root, attributes
/// become string entries, repeated child names are promoted to arrays,
/// text runs are concatenated under the reserved `"#text"` key, and an
/// association becomes an array field named after the association.
pub(crate) struct ObjectTreeBuilder {
    frames: Vec<Frame>,
    root: Option<(String, Value)>,
}

impl ObjectTreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            frames: Vec::new(),
            root: None,
        }
    }

    pub(crate) fn element_start(
        &mut self,
        name: &str,
        attr_names: &[&str],
        attr_values: &[&str],
    ) -> Result<(), ExportError> {
        if attr_names.len() != attr_values.len() {
            return Err(ProtocolError::AttributeArity {
                names: attr_names.len(),
                values: attr_values.len(),
            }
            .into());
        }
        let mut map = Map::new();
        for (attr, value) in attr_names.iter().zip(attr_values.iter()) {
            map.insert((*attr).to_string(), Value::String((*value).to_string()));
        }
        self.frames.push(Frame::Element {
            name: name.to_string(),
            map,
            text: String::new(),
        });
        Ok(())
    }

    pub(crate) fn element_end(&mut self, name: &str) -> Result<(), ExportError> {
        let frame = self.pop_frame(name)?;
        let (name, mut map, text) = match frame {
            Frame::Element { name, map, text } => (name, map, text),
            Frame::Association { name: open, .. } => {
                return Err(ProtocolError::MismatchedEnd {
                    expected: format!("association '{open}'"),
                    found: name.to_string(),
                }
                .into());
            }
        };
        if !text.is_empty() {
            map.insert("#text".to_string(), Value::String(text));
        }
        self.attach(name, Value::Object(map))
    }

    pub(crate) fn text(&mut self, content: &str) -> Result<(), ExportError> {
        match self.frames.last_mut() {
            Some(Frame::Element { text, .. }) => {
                text.push_str(content);
                Ok(())
            }
            _ => Err(ProtocolError::TextOutsideElement.into()),
        }
    }

    pub(crate) fn association_start(&mut self, name: &str) -> Result<(), ExportError> {
        self.frames.push(Frame::Association {
            name: name.to_string(),
            items: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn association_end(&mut self, name: &str) -> Result<(), ExportError> {
        let frame = self.pop_frame(name)?;
        let (name, items) = match frame {
            Frame::Association { name, items } => (name, items),
            Frame::Element { name: open, .. } => {
                return Err(ProtocolError::MismatchedEnd {
                    expected: format!("element '{open}'"),
                    found: name.to_string(),
                }
                .into());
            }
        };
        match self.frames.last_mut() {
            Some(Frame::Element { map, .. }) => {
                merge_association(map, name, items);
                Ok(())
            }
            _ => self.attach(name, Value::Array(items)),
        }
    }

    /// The assembled document: one root object keyed by the root element
    /// name. Consumes the builder state.
    pub(crate) fn take_root(&mut self) -> Result<Value, ExportError> {
        if let Some(innermost) = self.frames.last() {
            return Err(ProtocolError::UnterminatedDocument {
                open: self.frames.len(),
                innermost: innermost.name().to_string(),
            }
            .into());
        }
        match self.root.take() {
            Some((name, value)) => {
                let mut document = Map::new();
                document.insert(name, value);
                Ok(Value::Object(document))
            }
            None => Err(ProtocolError::EmptyDocument.into()),
        }
    }

    fn pop_frame(&mut self, name: &str) -> Result<Frame, ExportError> {
        match self.frames.pop() {
            Some(frame) => Ok(frame),
            None => Err(ProtocolError::EndWithoutStart {
                name: name.to_string(),
            }
            .into()),
        }
    }

    fn attach(&mut self, name: String, value: Value) -> Result<(), ExportError> {
        match self.frames.last_mut() {
            None => {
                self.root = Some((name, value));
                Ok(())
            }
            Some(Frame::Association { items, .. }) => {
                // Association children are bare objects; the association
                // event already carries their element name.
                items.push(value);
                Ok(())
            }
            Some(Frame::Element { map, .. }) => {
                insert_child(map, name, value);
                Ok(())
            }
        }
    }
}

/// Attach association items to the field, so sibling associations sharing
/// one name concatenate into a single flat array.
fn merge_association(map: &mut Map<String, Value>, name: String, items: Vec<Value>) {
    match map.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(Value::Array(items));
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(existing) => existing.extend(items),
            existing => {
                let first = existing.take();
                let mut merged = vec![first];
                merged.extend(items);
                *existing = Value::Array(merged);
            }
        },
    }
}

/// Insert a child value, promoting repeated names to arrays.
fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(existing) => existing.push(value),
            existing => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assembles_nested_objects_with_attributes() {
        let mut tree = ObjectTreeBuilder::new();
        tree.element_start("Customer", &["id"], &["1"]).unwrap();
        tree.element_start("Address", &["city"], &["Oslo"]).unwrap();
        tree.element_end("Address").unwrap();
        tree.element_end("Customer").unwrap();
        assert_eq!(
            tree.take_root().unwrap(),
            json!({"Customer": {"id": "1", "Address": {"city": "Oslo"}}})
        );
    }

    #[test]
    fn test_associations_become_named_arrays() {
        let mut tree = ObjectTreeBuilder::new();
        tree.element_start("Customer", &[], &[]).unwrap();
        tree.association_start("orders").unwrap();
        tree.element_start("Order", &["id"], &["7"]).unwrap();
        tree.element_end("Order").unwrap();
        tree.element_start("Order", &["id"], &["8"]).unwrap();
        tree.element_end("Order").unwrap();
        tree.association_end("orders").unwrap();
        tree.element_end("Customer").unwrap();
        assert_eq!(
            tree.take_root().unwrap(),
            json!({"Customer": {"orders": [{"id": "7"}, {"id": "8"}]}})
        );
    }

    #[test]
    fn test_sibling_associations_sharing_a_name_concatenate_flat() {
        let mut tree = ObjectTreeBuilder::new();
        tree.element_start("Customer", &[], &[]).unwrap();
        tree.association_start("orders").unwrap();
        tree.element_start("Order", &["id"], &["7"]).unwrap();
        tree.element_end("Order").unwrap();
        tree.association_end("orders").unwrap();
        tree.association_start("orders").unwrap();
        tree.element_start("Order", &["id"], &["8"]).unwrap();
        tree.element_end("Order").unwrap();
        tree.association_end("orders").unwrap();
        tree.element_end("Customer").unwrap();
        assert_eq!(
            tree.take_root().unwrap(),
            json!({"Customer": {"orders": [{"id": "7"}, {"id": "8"}]}})
        );
    }

    #[test]
    fn test_repeated_child_names_are_promoted_to_arrays() {
        let mut tree = ObjectTreeBuilder::new();
        tree.element_start("Customer", &[], &[]).unwrap();
        tree.element_start("Note", &[], &[]).unwrap();
        tree.text("a").unwrap();
        tree.element_end("Note").unwrap();
        tree.element_start("Note", &[], &[]).unwrap();
        tree.text("b").unwrap();
        tree.element_end("Note").unwrap();
        tree.element_end("Customer").unwrap();
        assert_eq!(
            tree.take_root().unwrap(),
            json!({"Customer": {"Note": [{"#text": "a"}, {"#text": "b"}]}})
        );
    }

    #[test]
    fn test_text_runs_are_concatenated() {
        let mut tree = ObjectTreeBuilder::new();
        tree.element_start("Note", &[], &[]).unwrap();
        tree.text("first ").unwrap();
        tree.text("second").unwrap();
        tree.element_end("Note").unwrap();
        assert_eq!(
            tree.take_root().unwrap(),
            json!({"Note": {"#text": "first second"}})
        );
    }

    #[test]
    fn test_take_root_rejects_unterminated_state() {
        let mut tree = ObjectTreeBuilder::new();
        tree.element_start("Customer", &[], &[]).unwrap();
        assert!(tree.take_root().is_err());
    }
}
