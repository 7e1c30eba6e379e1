//! Flat dataset emitter: one self-closing XML element per row.

use crate::export::ExportError;
use crate::export::rows::{RowScriptEmitter, TableScope};
use crate::validation::validate_xml_name;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Emits a row-per-record dataset: a single `<dataset>` root containing
/// one element per row, named after its table, with columns as attributes.
/// Absent values are omitted rather than rendered.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::{FlatDatasetEmitter, RowScriptEmitter};
///
/// let mut dataset = FlatDatasetEmitter::new();
/// dataset.begin_table("CUSTOMER", &["ID", "NAME"]).unwrap();
/// dataset.row(&[Some("1"), None]).unwrap();
/// dataset.end_table().unwrap();
/// let xml = dataset.finish().unwrap();
/// assert!(xml.contains("<CUSTOMER ID=\"1\"/>"));
/// ```
pub struct FlatDatasetEmitter {
    scope: TableScope,
    writer: Writer<Vec<u8>>,
    root_open: bool,
}

impl FlatDatasetEmitter {
    pub fn new() -> Self {
        Self {
            scope: TableScope::default(),
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            root_open: false,
        }
    }

    fn ensure_root(&mut self) -> Result<(), ExportError> {
        if !self.root_open {
            self.root_open = true;
            self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            self.write(Event::Start(BytesStart::new("dataset")))?;
        }
        Ok(())
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Io(e.to_string()))
    }
}

impl Default for FlatDatasetEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RowScriptEmitter for FlatDatasetEmitter {
    fn begin_table(&mut self, table: &str, columns: &[&str]) -> Result<(), ExportError> {
        validate_xml_name(table)?;
        for column in columns {
            validate_xml_name(column)?;
        }
        self.scope.open(table, columns)?;
        self.ensure_root()
    }

    fn row(&mut self, values: &[Option<&str>]) -> Result<(), ExportError> {
        let (table, columns) = self.scope.current(values.len())?;
        let mut record = BytesStart::new(table.to_string());
        for (column, value) in columns.iter().zip(values.iter()) {
            if let Some(value) = value {
                record.push_attribute((column.as_str(), *value));
            }
        }
        self.writer
            .write_event(Event::Empty(record))
            .map_err(|e| ExportError::Io(e.to_string()))
    }

    fn end_table(&mut self) -> Result<(), ExportError> {
        self.scope.close()?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        self.ensure_root()?;
        let sanitized = text.replace("--", "- -");
        self.write(Event::Comment(BytesText::new(&sanitized)))
    }

    fn finish(&mut self) -> Result<String, ExportError> {
        self.scope.ensure_closed()?;
        self.ensure_root()?;
        self.write(Event::End(BytesEnd::new("dataset")))?;
        let writer = std::mem::replace(&mut self.writer, Writer::new(Vec::new()));
        String::from_utf8(writer.into_inner())
            .map_err(|e| ExportError::Serialization(e.to_string()))
    }
}
