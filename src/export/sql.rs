//! SQL insert-script emitter.

use crate::export::ExportError;
use crate::export::rows::{RowScriptEmitter, TableScope};

/// Emits one `INSERT` statement per row, with double-quoted identifiers
/// and single-quote doubling in literals.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::{RowScriptEmitter, SqlScriptEmitter};
///
/// let mut sql = SqlScriptEmitter::new();
/// sql.begin_table("CUSTOMER", &["ID", "NAME"]).unwrap();
/// sql.row(&[Some("1"), Some("O'Hara")]).unwrap();
/// sql.row(&[Some("2"), None]).unwrap();
/// sql.end_table().unwrap();
/// let script = sql.finish().unwrap();
/// assert!(script.contains(
///     "INSERT INTO \"CUSTOMER\" (\"ID\", \"NAME\") VALUES ('1', 'O''Hara');"
/// ));
/// assert!(script.contains("VALUES ('2', NULL);"));
/// ```
pub struct SqlScriptEmitter {
    scope: TableScope,
    buffer: String,
}

impl SqlScriptEmitter {
    /// Create an emitter with a generated-at header.
    pub fn new() -> Self {
        let mut buffer = String::new();
        buffer.push_str(&format!(
            "-- generated by dataset-export-sdk at {}\n",
            chrono::Utc::now().to_rfc3339()
        ));
        Self {
            scope: TableScope::default(),
            buffer,
        }
    }
}

impl Default for SqlScriptEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn quote_literal(value: Option<&str>) -> String {
    match value {
        None => "NULL".to_string(),
        Some(v) => format!("'{}'", v.replace('\'', "''")),
    }
}

impl RowScriptEmitter for SqlScriptEmitter {
    fn begin_table(&mut self, table: &str, columns: &[&str]) -> Result<(), ExportError> {
        self.scope.open(table, columns)?;
        self.buffer.push('\n');
        Ok(())
    }

    fn row(&mut self, values: &[Option<&str>]) -> Result<(), ExportError> {
        let (table, columns) = self.scope.current(values.len())?;
        let column_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let value_list = values
            .iter()
            .map(|v| quote_literal(*v))
            .collect::<Vec<_>>()
            .join(", ");
        self.buffer.push_str(&format!(
            "INSERT INTO {} ({}) VALUES ({});\n",
            quote_identifier(table),
            column_list,
            value_list
        ));
        Ok(())
    }

    fn end_table(&mut self) -> Result<(), ExportError> {
        self.scope.close()?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        for line in text.lines() {
            self.buffer.push_str(&format!("-- {line}\n"));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<String, ExportError> {
        self.scope.ensure_closed()?;
        Ok(std::mem::take(&mut self.buffer))
    }
}
