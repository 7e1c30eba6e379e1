//! Validation functionality
//!
//! Provides validation logic for:
//! - Element, attribute and association names (renderer preconditions)
//! - XML tag names (reserved prefixes, character rules)

pub mod input;

pub use input::{
    ValidationError, ValidationResult, validate_association_name, validate_attribute_name,
    validate_element_name, validate_xml_name,
};
