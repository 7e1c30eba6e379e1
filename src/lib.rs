//! Dataset Export SDK - Shared library for rendering relational data
//! snapshots into script and object notations
//!
//! Provides unified interfaces for:
//! - The format registry (capabilities and presentation metadata per
//!   supported notation)
//! - The traversal protocol (the visitor contract object-notation
//!   renderers implement)
//! - Renderers for JSON, YAML and XML documents
//! - Row emitters for SQL scripts, intra-database receipts, flat datasets
//!   and change-management scripts
//! - Name validation shared by the renderers

pub mod export;
pub mod formats;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use export::{
    ChangeLogEmitter, ExportError, ExportResult, FlatDatasetEmitter, JsonRenderer,
    ObjectNotationRenderer, ObjectNotationWriter, ProtocolError, ReceiptEmitter,
    RowScriptEmitter, ScopeGuard, SqlScriptEmitter, XmlRenderer, YamlRenderer, export_document,
    walk_document, write_export,
};
pub use formats::{FormatDescriptor, FormatError, ScriptFormat, ScriptWriter};

// Re-export models
pub use models::{Association, Attribute, Element, Node};

// Re-export validation types
pub use validation::{
    ValidationError, validate_association_name, validate_attribute_name, validate_element_name,
    validate_xml_name,
};
