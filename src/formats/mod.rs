//! Format registry
//!
//! The closed, statically known set of output notations the SDK can render,
//! each annotated with structural capabilities and presentation metadata.
//! The registry is load-time-constant configuration data: there are no
//! mutation operations, and the descriptor table is safely shared between
//! concurrent exports.
//!
//! # Serde Casing Conventions
//!
//! `ScriptFormat` serializes as `SCREAMING_SNAKE_CASE` identifiers, the
//! convention used for technical/database constants throughout the SDK.

use crate::export::changelog::ChangeLogEmitter;
use crate::export::dataset::FlatDatasetEmitter;
use crate::export::json::JsonRenderer;
use crate::export::receipt::ReceiptEmitter;
use crate::export::rows::RowScriptEmitter;
use crate::export::sql::SqlScriptEmitter;
use crate::export::writer::ObjectNotationRenderer;
use crate::export::xml::XmlRenderer;
use crate::export::yaml::YamlRenderer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FormatError {
    /// The identifier does not name a supported script format
    #[error("unknown script format identifier: {0}")]
    UnknownFormat(String),
}

/// The supported output notations.
///
/// The set is closed and known at compile time; every variant has exactly
/// one [`FormatDescriptor`] in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptFormat {
    /// SQL insert script
    Sql,
    /// Receipt for an export performed inside the database
    IntraDatabase,
    /// JSON object notation
    Json,
    /// YAML object notation
    Yaml,
    /// Generic XML object notation
    Xml,
    /// Row-per-record flat dataset
    FlatDataset,
    /// Change-management script (change log with one insert per row)
    ChangeManagement,
}

/// Immutable metadata record describing one supported output notation.
///
/// One instance exists per registry entry, created at startup and never
/// mutated. `is_object_notation` decides which emission path a caller must
/// drive: object notations go through the traversal protocol, everything
/// else through a row emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    /// The format this descriptor describes
    pub format: ScriptFormat,
    /// Human-readable display name
    pub display_name: &'static str,
    /// Title for the format chooser dialog
    pub chooser_title: &'static str,
    /// Default file extension, including the leading separator
    pub file_extension: &'static str,
    /// True for hierarchical formats that require the traversal protocol
    pub is_object_notation: bool,
    /// Presentation hint: this entry is followed by a divider in a choice list
    pub separator_followed: bool,
}

/// The canonical, ordered descriptor table.
static REGISTRY: [FormatDescriptor; 7] = [
    FormatDescriptor {
        format: ScriptFormat::Sql,
        display_name: "SQL",
        chooser_title: "SQL export script",
        file_extension: ".sql",
        is_object_notation: false,
        separator_followed: false,
    },
    FormatDescriptor {
        format: ScriptFormat::IntraDatabase,
        display_name: "Intra-database",
        chooser_title: "Receipt for intra-database export",
        file_extension: ".txt",
        is_object_notation: false,
        separator_followed: true,
    },
    FormatDescriptor {
        format: ScriptFormat::Json,
        display_name: "JSON",
        chooser_title: "JSON document",
        file_extension: ".json",
        is_object_notation: true,
        separator_followed: false,
    },
    FormatDescriptor {
        format: ScriptFormat::Yaml,
        display_name: "YAML",
        chooser_title: "YAML document",
        file_extension: ".yaml",
        is_object_notation: true,
        separator_followed: false,
    },
    FormatDescriptor {
        format: ScriptFormat::Xml,
        display_name: "XML",
        chooser_title: "XML document",
        file_extension: ".xml",
        is_object_notation: true,
        separator_followed: true,
    },
    FormatDescriptor {
        format: ScriptFormat::FlatDataset,
        display_name: "Flat dataset",
        chooser_title: "Flat row-per-record dataset",
        file_extension: ".xml",
        is_object_notation: false,
        separator_followed: false,
    },
    FormatDescriptor {
        format: ScriptFormat::ChangeManagement,
        display_name: "Change management",
        chooser_title: "Change management script",
        file_extension: ".xml",
        is_object_notation: false,
        separator_followed: false,
    },
];

/// The writer for one export, branched once on the format's capability.
///
/// The two emission paths are mutually exclusive by construction: a format
/// yields either a traversal-protocol renderer or a row emitter, never both.
pub enum ScriptWriter {
    /// Hierarchical path: drive the traversal protocol against this renderer
    Object(Box<dyn ObjectNotationRenderer>),
    /// Flat path: feed tables and rows to this emitter
    Rows(Box<dyn RowScriptEmitter>),
}

impl ScriptFormat {
    /// The canonical identifier of this format (e.g. `"FLAT_DATASET"`).
    pub fn identifier(&self) -> &'static str {
        match self {
            ScriptFormat::Sql => "SQL",
            ScriptFormat::IntraDatabase => "INTRA_DATABASE",
            ScriptFormat::Json => "JSON",
            ScriptFormat::Yaml => "YAML",
            ScriptFormat::Xml => "XML",
            ScriptFormat::FlatDataset => "FLAT_DATASET",
            ScriptFormat::ChangeManagement => "CHANGE_MANAGEMENT",
        }
    }

    /// The registry entry for this format.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dataset_export_sdk::formats::ScriptFormat;
    ///
    /// let descriptor = ScriptFormat::Json.descriptor();
    /// assert!(descriptor.is_object_notation);
    /// assert_eq!(descriptor.file_extension, ".json");
    /// ```
    pub fn descriptor(&self) -> &'static FormatDescriptor {
        REGISTRY
            .iter()
            .find(|d| d.format == *self)
            .expect("every ScriptFormat has a registry entry")
    }

    /// Construct the writer for this format, branching once on its
    /// structural capability.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dataset_export_sdk::formats::{ScriptFormat, ScriptWriter};
    ///
    /// match ScriptFormat::Yaml.new_writer() {
    ///     ScriptWriter::Object(_) => {}
    ///     ScriptWriter::Rows(_) => unreachable!("YAML is an object notation"),
    /// }
    /// ```
    pub fn new_writer(self) -> ScriptWriter {
        match self {
            ScriptFormat::Json => ScriptWriter::Object(Box::new(JsonRenderer::new())),
            ScriptFormat::Yaml => ScriptWriter::Object(Box::new(YamlRenderer::new())),
            ScriptFormat::Xml => ScriptWriter::Object(Box::new(XmlRenderer::new())),
            ScriptFormat::Sql => ScriptWriter::Rows(Box::new(SqlScriptEmitter::new())),
            ScriptFormat::IntraDatabase => ScriptWriter::Rows(Box::new(ReceiptEmitter::new())),
            ScriptFormat::FlatDataset => ScriptWriter::Rows(Box::new(FlatDatasetEmitter::new())),
            ScriptFormat::ChangeManagement => {
                ScriptWriter::Rows(Box::new(ChangeLogEmitter::new()))
            }
        }
    }
}

impl fmt::Display for ScriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ScriptFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SQL" => Ok(ScriptFormat::Sql),
            "INTRA_DATABASE" => Ok(ScriptFormat::IntraDatabase),
            "JSON" => Ok(ScriptFormat::Json),
            "YAML" => Ok(ScriptFormat::Yaml),
            "XML" => Ok(ScriptFormat::Xml),
            "FLAT_DATASET" => Ok(ScriptFormat::FlatDataset),
            "CHANGE_MANAGEMENT" => Ok(ScriptFormat::ChangeManagement),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

impl FormatDescriptor {
    /// Enumerate the fixed, ordered descriptor set.
    ///
    /// The order (and the `separator_followed` hints) match the canonical
    /// choice-list presentation.
    pub fn all() -> &'static [FormatDescriptor] {
        &REGISTRY
    }

    /// Look up a descriptor by its canonical identifier.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dataset_export_sdk::formats::FormatDescriptor;
    ///
    /// let yaml = FormatDescriptor::lookup("YAML").unwrap();
    /// assert_eq!(yaml.file_extension, ".yaml");
    /// assert!(FormatDescriptor::lookup("PROTOBUF").is_err());
    /// ```
    pub fn lookup(identifier: &str) -> Result<&'static FormatDescriptor, FormatError> {
        let format = ScriptFormat::from_str(identifier)?;
        Ok(format.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_table_is_preserved() {
        let expected = [
            (ScriptFormat::Sql, false, ".sql"),
            (ScriptFormat::IntraDatabase, false, ".txt"),
            (ScriptFormat::Json, true, ".json"),
            (ScriptFormat::Yaml, true, ".yaml"),
            (ScriptFormat::Xml, true, ".xml"),
            (ScriptFormat::FlatDataset, false, ".xml"),
            (ScriptFormat::ChangeManagement, false, ".xml"),
        ];
        for (format, object_notation, extension) in expected {
            let descriptor = format.descriptor();
            assert_eq!(descriptor.is_object_notation, object_notation, "{format}");
            assert_eq!(descriptor.file_extension, extension, "{format}");
        }
    }

    #[test]
    fn test_enumeration_preserves_canonical_order_and_dividers() {
        let all = FormatDescriptor::all();
        assert_eq!(all.len(), 7);
        let order: Vec<ScriptFormat> = all.iter().map(|d| d.format).collect();
        assert_eq!(
            order,
            vec![
                ScriptFormat::Sql,
                ScriptFormat::IntraDatabase,
                ScriptFormat::Json,
                ScriptFormat::Yaml,
                ScriptFormat::Xml,
                ScriptFormat::FlatDataset,
                ScriptFormat::ChangeManagement,
            ]
        );
        let dividers: Vec<ScriptFormat> = all
            .iter()
            .filter(|d| d.separator_followed)
            .map(|d| d.format)
            .collect();
        assert_eq!(
            dividers,
            vec![ScriptFormat::IntraDatabase, ScriptFormat::Xml]
        );
    }

    #[test]
    fn test_lookup_round_trips_identifiers() {
        for descriptor in FormatDescriptor::all() {
            let found = FormatDescriptor::lookup(descriptor.format.identifier()).unwrap();
            assert_eq!(found, descriptor);
        }
    }

    #[test]
    fn test_lookup_rejects_unknown_identifier() {
        assert_eq!(
            FormatDescriptor::lookup("AVRO"),
            Err(FormatError::UnknownFormat("AVRO".to_string()))
        );
    }

    #[test]
    fn test_writer_kind_matches_capability_flag() {
        for descriptor in FormatDescriptor::all() {
            let writer = descriptor.format.new_writer();
            match writer {
                ScriptWriter::Object(_) => assert!(descriptor.is_object_notation),
                ScriptWriter::Rows(_) => assert!(!descriptor.is_object_notation),
            }
        }
    }
}
