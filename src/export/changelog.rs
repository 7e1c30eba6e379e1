//! Change-management script emitter.
//!
//! Emits a change log with one change set per table and one `<insert>`
//! per row, the shape change-management tooling replays against a target
//! database.

use crate::export::ExportError;
use crate::export::rows::{RowScriptEmitter, TableScope};
use crate::validation::validate_xml_name;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

const CHANGELOG_AUTHOR: &str = "dataset-export-sdk";

/// Emits change-management XML: `<databaseChangeLog>` containing one
/// `<changeSet>` per table (uuid id, generated-at date) with one
/// `<insert>` per row and one `<column>` per present value.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::{ChangeLogEmitter, RowScriptEmitter};
///
/// let mut log = ChangeLogEmitter::new();
/// log.begin_table("CUSTOMER", &["ID"]).unwrap();
/// log.row(&[Some("1")]).unwrap();
/// log.end_table().unwrap();
/// let xml = log.finish().unwrap();
/// assert!(xml.contains("<insert tableName=\"CUSTOMER\">"));
/// assert!(xml.contains("<column name=\"ID\" value=\"1\"/>"));
/// ```
pub struct ChangeLogEmitter {
    scope: TableScope,
    writer: Writer<Vec<u8>>,
    root_open: bool,
}

impl ChangeLogEmitter {
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
            let mut root = BytesStart::new("databaseChangeLog");
            root.push_attribute(("xmlns", "http://www.liquibase.org/xml/ns/dbchangelog"));
            self.write(Event::Start(root))?;
        }
        Ok(())
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Io(e.to_string()))
    }
}

impl Default for ChangeLogEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RowScriptEmitter for ChangeLogEmitter {
    fn begin_table(&mut self, table: &str, columns: &[&str]) -> Result<(), ExportError> {
        validate_xml_name(table)?;
        for column in columns {
            validate_xml_name(column)?;
        }
        self.scope.open(table, columns)?;
        self.ensure_root()?;
        let mut change_set = BytesStart::new("changeSet");
        change_set.push_attribute(("id", uuid::Uuid::new_v4().to_string().as_str()));
        change_set.push_attribute(("author", CHANGELOG_AUTHOR));
        change_set.push_attribute((
            "created",
            chrono::Utc::now().format("%Y-%m-%d").to_string().as_str(),
        ));
        self.write(Event::Start(change_set))
    }

    fn row(&mut self, values: &[Option<&str>]) -> Result<(), ExportError> {
        let (table, columns) = self.scope.current(values.len())?;
        let mut insert = BytesStart::new("insert");
        insert.push_attribute(("tableName", table));
        let mut events = vec![Event::Start(insert)];
        for (column, value) in columns.iter().zip(values.iter()) {
            if let Some(value) = value {
                let mut cell = BytesStart::new("column");
                cell.push_attribute(("name", column.as_str()));
                cell.push_attribute(("value", *value));
                events.push(Event::Empty(cell));
            }
        }
        events.push(Event::End(BytesEnd::new("insert")));
        for event in events {
            self.writer
                .write_event(event)
                .map_err(|e| ExportError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn end_table(&mut self) -> Result<(), ExportError> {
        self.scope.close()?;
        self.write(Event::End(BytesEnd::new("changeSet")))
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        self.ensure_root()?;
        let sanitized = text.replace("--", "- -");
        self.write(Event::Comment(BytesText::new(&sanitized)))
    }

    fn finish(&mut self) -> Result<String, ExportError> {
        self.scope.ensure_closed()?;
        self.ensure_root()?;
        self.write(Event::End(BytesEnd::new("databaseChangeLog")))?;
        let writer = std::mem::replace(&mut self.writer, Writer::new(Vec::new()));
        String::from_utf8(writer.into_inner())
            .map_err(|e| ExportError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_change_set_per_table() {
        let mut log = ChangeLogEmitter::new();
        log.begin_table("CUSTOMER", &["ID"]).unwrap();
        log.row(&[Some("1")]).unwrap();
        log.end_table().unwrap();
        log.begin_table("ORDER", &["ID"]).unwrap();
        log.row(&[Some("7")]).unwrap();
        log.end_table().unwrap();

        let xml = log.finish().unwrap();
        assert_eq!(xml.matches("<changeSet ").count(), 2);
        assert_eq!(xml.matches("</changeSet>").count(), 2);
        assert!(xml.contains("author=\"dataset-export-sdk\""));
    }

    #[test]
    fn test_absent_values_produce_no_column_entry() {
        let mut log = ChangeLogEmitter::new();
        log.begin_table("CUSTOMER", &["ID", "NAME"]).unwrap();
        log.row(&[Some("1"), None]).unwrap();
        log.end_table().unwrap();
        let xml = log.finish().unwrap();
        assert!(xml.contains("<column name=\"ID\" value=\"1\"/>"));
        assert!(!xml.contains("name=\"NAME\""));
    }

    #[test]
    fn test_change_set_ids_are_unique() {
        let mut log = ChangeLogEmitter::new();
        log.begin_table("A", &["ID"]).unwrap();
        log.end_table().unwrap();
        log.begin_table("B", &["ID"]).unwrap();
        log.end_table().unwrap();
        let xml = log.finish().unwrap();
        let ids: Vec<&str> = xml
            .split("id=\"")
            .skip(1)
            .map(|rest| rest.split('"').next().unwrap_or_default())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}
