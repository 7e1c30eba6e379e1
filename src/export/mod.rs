//! Export functionality
//!
//! Provides the traversal protocol and the renderers/emitters for the
//! supported notations:
//! - JSON, YAML, XML (object notations, driven through the traversal
//!   protocol)
//! - SQL, intra-database receipt, flat dataset, change-management script
//!   (flat formats, driven through the row protocol)

pub mod changelog;
pub mod dataset;
pub mod json;
pub mod receipt;
pub mod rows;
pub mod sql;
mod tree;
pub mod walker;
pub mod writer;
pub mod xml;
pub mod yaml;

use crate::formats::{ScriptFormat, ScriptWriter};
use crate::models::Element;
use crate::validation::ValidationError;
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

pub use changelog::ChangeLogEmitter;
pub use dataset::FlatDatasetEmitter;
pub use json::JsonRenderer;
pub use receipt::ReceiptEmitter;
pub use rows::RowScriptEmitter;
pub use sql::SqlScriptEmitter;
pub use walker::walk_document;
pub use writer::{ObjectNotationRenderer, ObjectNotationWriter, ProtocolError, ScopeGuard};
pub use xml::XmlRenderer;
pub use yaml::YamlRenderer;

/// Result of an export operation.
///
/// Contains the exported content and format identifier.
#[derive(Debug, Serialize)]
#[must_use = "export results contain the exported content and should be used"]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
pub enum ExportError {
    /// Stack-discipline breach in the event stream; always a producer bug
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    /// The target notation cannot represent the given data
    #[error("notation validation failed: {0}")]
    Notation(#[from] ValidationError),
    /// Serializing the accumulated document failed
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The output destination failed; propagated unchanged, never retried
    #[error("IO error: {0}")]
    Io(String),
    /// The format has no hierarchical representation
    #[error("format {0} is not an object notation; drive its row emitter instead")]
    NotObjectNotation(String),
}

/// Render one document instance in the given object notation.
///
/// Flat formats have no hierarchical representation and are rejected
/// before any traversal begins; feed them rows through
/// [`ScriptFormat::new_writer`] instead.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::export_document;
/// use dataset_export_sdk::formats::ScriptFormat;
/// use dataset_export_sdk::models::Element;
///
/// let root = Element::root("Customer")
///     .with_attributes(&["id"], &["1"])
///     .unwrap();
/// let result = export_document(&root, ScriptFormat::Json).unwrap();
/// assert_eq!(result.format, "JSON");
/// assert!(result.content.contains("Customer"));
/// ```
pub fn export_document(
    root: &Element,
    format: ScriptFormat,
) -> Result<ExportResult, ExportError> {
    let mut renderer = match format.new_writer() {
        ScriptWriter::Object(renderer) => renderer,
        ScriptWriter::Rows(_) => {
            return Err(ExportError::NotObjectNotation(format.to_string()));
        }
    };
    walk_document(root, &mut *renderer)?;
    Ok(ExportResult {
        content: renderer.finish()?,
        format: format.to_string(),
    })
}

/// Write an export result to a file.
///
/// I/O failures propagate unchanged; nothing is retried, since retrying a
/// partially written structured document would require a rollback the
/// caller owns (truncate and retry, or discard).
pub fn write_export(result: &ExportResult, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, &result.content).with_context(|| {
        format!(
            "failed to write {} export to {}",
            result.format,
            path.display()
        )
    })
}
