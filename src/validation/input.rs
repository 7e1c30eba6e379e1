//! Input validation for names flowing into renderers and emitters.
//!
//! This module provides functions for validating element, attribute and
//! association names before they are handed to a notation renderer. These
//! functions are used by the tree walker and by the XML-based emitters to
//! reject data a target notation cannot represent.
//!
//! # Security
//!
//! Name validation prevents:
//! - SQL injection via malicious table/column names in generated scripts
//! - Malformed markup via names that are not valid XML names
//! - Buffer bloat via excessively long identifiers

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Maximum length for element names
pub const MAX_ELEMENT_NAME_LENGTH: usize = 255;

/// Maximum length for attribute names
pub const MAX_ATTRIBUTE_NAME_LENGTH: usize = 255;

/// Maximum length for association names
pub const MAX_ASSOCIATION_NAME_LENGTH: usize = 255;

static RE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("Invalid regex"));
static RE_XML_RESERVED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^xml").expect("Invalid regex"));

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),

    /// Parallel attribute sequences differ in length
    #[error("attribute names and values differ in length ({names} names, {values} values)")]
    LengthMismatch { names: usize, values: usize },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn validate_name(field: &'static str, name: &str, max: usize) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Empty(field));
    }

    if name.len() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: name.len(),
        });
    }

    if !RE_NAME.is_match(name) {
        return Err(ValidationError::InvalidCharacters {
            field,
            reason: "must start with a letter or underscore and contain only letters, digits, '_', '-' or '.'".to_string(),
        });
    }

    Ok(())
}

/// Validate an element name.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must start with a letter or underscore
/// - May contain letters, digits, underscores, hyphens, and dots
///
/// # Examples
///
/// ```
/// use dataset_export_sdk::validation::validate_element_name;
///
/// assert!(validate_element_name("CUSTOMER").is_ok());
/// assert!(validate_element_name("order_line").is_ok());
/// assert!(validate_element_name("").is_err());
/// assert!(validate_element_name("7up").is_err());
/// ```
pub fn validate_element_name(name: &str) -> ValidationResult<()> {
    validate_name("element name", name, MAX_ELEMENT_NAME_LENGTH)
}

/// Validate an attribute name. Same rules as [`validate_element_name`].
pub fn validate_attribute_name(name: &str) -> ValidationResult<()> {
    validate_name("attribute name", name, MAX_ATTRIBUTE_NAME_LENGTH)
}

/// Validate an association name. Same rules as [`validate_element_name`].
pub fn validate_association_name(name: &str) -> ValidationResult<()> {
    validate_name("association name", name, MAX_ASSOCIATION_NAME_LENGTH)
}

/// Validate a name for use as an XML tag or attribute name.
///
/// On top of the general name rules, XML reserves names starting with
/// `xml` in any casing.
///
/// # Examples
///
/// ```
/// use dataset_export_sdk::validation::validate_xml_name;
///
/// assert!(validate_xml_name("Order").is_ok());
/// assert!(validate_xml_name("xmlOrder").is_err());
/// ```
pub fn validate_xml_name(name: &str) -> ValidationResult<()> {
    validate_name("XML name", name, MAX_ELEMENT_NAME_LENGTH)?;

    if RE_XML_RESERVED_PREFIX.is_match(name) {
        return Err(ValidationError::InvalidFormat(
            "XML name",
            format!("'{}' uses the reserved 'xml' prefix", name),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_typical_table_and_column_names() {
        assert!(validate_element_name("CUSTOMER").is_ok());
        assert!(validate_element_name("order_line").is_ok());
        assert!(validate_attribute_name("created-at").is_ok());
        assert!(validate_association_name("orders").is_ok());
    }

    #[test]
    fn test_rejects_empty_names() {
        assert_eq!(
            validate_element_name(""),
            Err(ValidationError::Empty("element name"))
        );
    }

    #[test]
    fn test_rejects_leading_digit() {
        assert!(matches!(
            validate_element_name("1customer"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_rejects_embedded_whitespace_and_quotes() {
        assert!(validate_element_name("drop table").is_err());
        assert!(validate_attribute_name("name\"").is_err());
    }

    #[test]
    fn test_rejects_overlong_names() {
        let name = "a".repeat(MAX_ELEMENT_NAME_LENGTH + 1);
        assert!(matches!(
            validate_element_name(&name),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_xml_names_reject_reserved_prefix() {
        assert!(validate_xml_name("XMLthing").is_err());
        assert!(validate_xml_name("xml").is_err());
        assert!(validate_xml_name("myxml").is_ok());
    }
}
