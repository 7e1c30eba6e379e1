//! Document model for one export traversal

use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// One name/value pair attached to an element.
///
/// Attribute order within an element is caller-significant and preserved;
/// names are expected to be unique within one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (column name in the source data)
    pub name: String,
    /// Attribute value, already rendered to text by the producer
    pub value: String,
}

/// One node in the hierarchy of a document instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A nested element (plain containment)
    Element(Element),
    /// A run of character data belonging to the enclosing element
    Text(String),
    /// A free-form annotation with no structural effect
    Comment(String),
    /// A labeled relation introducing a set of child elements
    Association(Association),
}

/// A labeled relation from a parent element to a set of child elements.
///
/// An association is visited as a bracketing event around the elements it
/// introduces, distinct from plain containment: renderers may represent
/// "this nesting exists because of relation R" differently from a nested
/// element (object notations typically render it as a named array).
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::models::{Association, Element};
///
/// let mut orders = Association::new("orders", "Order");
/// orders.push(Element::new("Order"));
/// assert_eq!(orders.elements.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// Name of the relationship (e.g. a foreign-key role)
    pub name: String,
    /// Element name of the child elements the association introduces
    pub element_name: String,
    /// The child elements, in source order
    pub elements: Vec<Element>,
}

impl Association {
    /// Create an empty association edge.
    pub fn new(name: impl Into<String>, element_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_name: element_name.into(),
            elements: Vec::new(),
        }
    }

    /// Append a child element to the association.
    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }
}

/// One element in the hierarchy, representing one entity instance
/// (typically one data row).
///
/// Elements are constructed by the extraction collaborator for the duration
/// of one traversal and are not retained after the walk completes. A
/// renderer never keeps references into this tree past a single visit call.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::models::Element;
///
/// let customer = Element::root("Customer")
///     .with_attributes(&["id", "name"], &["1", "Ada"])
///     .unwrap();
/// assert!(customer.is_root);
/// assert_eq!(customer.attribute("id"), Some("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element name, corresponding to an entity/table name
    pub name: String,
    /// True for exactly one element per top-level document instance
    pub is_root: bool,
    /// Ordered attribute list; order is caller-significant
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Ordered children (elements, text, comments, associations)
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    /// Create a non-root element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: false,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create the root element of a document instance.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            is_root: true,
            ..Self::new(name)
        }
    }

    /// Attach attributes from parallel name/value sequences.
    ///
    /// The two sequences must have equal length; unequal lengths are
    /// rejected here, before any renderer can be called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dataset_export_sdk::models::Element;
    ///
    /// assert!(Element::new("Order").with_attributes(&["id"], &["7"]).is_ok());
    /// assert!(Element::new("Order").with_attributes(&["id", "total"], &["7"]).is_err());
    /// ```
    pub fn with_attributes(
        mut self,
        names: &[&str],
        values: &[&str],
    ) -> Result<Self, ValidationError> {
        if names.len() != values.len() {
            return Err(ValidationError::LengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        }
        for (name, value) in names.iter().zip(values.iter()) {
            self.attributes.push(Attribute {
                name: (*name).to_string(),
                value: (*value).to_string(),
            });
        }
        Ok(self)
    }

    /// Append a single attribute, preserving insertion order.
    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Append a nested element.
    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Append a run of character data.
    ///
    /// Whitespace-only runs may be stored here; they are filtered at the
    /// traversal boundary and never reach a renderer.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Append a comment annotation.
    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.children.push(Node::Comment(text.into()));
    }

    /// Append an association edge.
    pub fn push_association(&mut self, association: Association) {
        self.children.push(Node::Association(association));
    }
}
