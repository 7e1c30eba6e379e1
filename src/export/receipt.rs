//! Receipt emitter for intra-database exports.
//!
//! When the export happens inside the database, no data leaves it; the
//! artifact is a plain-text receipt of what was transferred.

use crate::export::ExportError;
use crate::export::rows::{RowScriptEmitter, TableScope};

/// Emits per-table row counts and a trailing total as plain text.
pub struct ReceiptEmitter {
    scope: TableScope,
    tables: Vec<(String, usize)>,
    notes: Vec<String>,
}

impl ReceiptEmitter {
    pub fn new() -> Self {
        Self {
            scope: TableScope::default(),
            tables: Vec::new(),
            notes: Vec::new(),
        }
    }
}

impl Default for ReceiptEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RowScriptEmitter for ReceiptEmitter {
    fn begin_table(&mut self, table: &str, columns: &[&str]) -> Result<(), ExportError> {
        self.scope.open(table, columns)?;
        self.tables.push((table.to_string(), 0));
        Ok(())
    }

    fn row(&mut self, values: &[Option<&str>]) -> Result<(), ExportError> {
        self.scope.current(values.len())?;
        if let Some(last) = self.tables.last_mut() {
            last.1 += 1;
        }
        Ok(())
    }

    fn end_table(&mut self) -> Result<(), ExportError> {
        self.scope.close()?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        self.notes.push(text.to_string());
        Ok(())
    }

    fn finish(&mut self) -> Result<String, ExportError> {
        self.scope.ensure_closed()?;
        let mut receipt = String::new();
        receipt.push_str(&format!(
            "Export receipt (generated at {})\n\n",
            chrono::Utc::now().to_rfc3339()
        ));
        let mut total = 0;
        for (table, rows) in &self.tables {
            receipt.push_str(&format!("{rows:>10} rows   {table}\n"));
            total += rows;
        }
        receipt.push_str(&format!("\n{total:>10} rows total\n"));
        for note in &self.notes {
            receipt.push_str(&format!("\nnote: {note}\n"));
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_rows_per_table() {
        let mut receipt = ReceiptEmitter::new();
        receipt.begin_table("CUSTOMER", &["ID"]).unwrap();
        receipt.row(&[Some("1")]).unwrap();
        receipt.row(&[Some("2")]).unwrap();
        receipt.end_table().unwrap();
        receipt.begin_table("ORDER", &["ID"]).unwrap();
        receipt.row(&[Some("7")]).unwrap();
        receipt.end_table().unwrap();

        let text = receipt.finish().unwrap();
        assert!(text.contains("2 rows   CUSTOMER"));
        assert!(text.contains("1 rows   ORDER"));
        assert!(text.contains("3 rows total"));
    }

    #[test]
    fn test_notes_are_appended() {
        let mut receipt = ReceiptEmitter::new();
        receipt.comment("no constraints checked").unwrap();
        let text = receipt.finish().unwrap();
        assert!(text.contains("note: no constraints checked"));
    }
}
