//! Row-oriented emission for flat (non-object-notation) formats.
//!
//! Flat formats have no hierarchy: the caller announces a table, feeds it
//! rows, closes it, and moves to the next table. The protocol mirrors the
//! traversal protocol's discipline at table granularity.

use crate::export::ExportError;
use crate::export::writer::ProtocolError;

/// The emission contract for flat, one-record-per-unit formats.
///
/// Exactly one table may be open at a time; every row must match the arity
/// of the announced column list.
pub trait RowScriptEmitter {
    /// Announce a table and its column list. Fails if a table is open.
    fn begin_table(&mut self, table: &str, columns: &[&str]) -> Result<(), ExportError>;

    /// Emit one row for the open table. `None` renders as the notation's
    /// null/absent representation.
    fn row(&mut self, values: &[Option<&str>]) -> Result<(), ExportError>;

    /// Close the open table.
    fn end_table(&mut self) -> Result<(), ExportError>;

    /// Deliver an annotation; emitted as notation-specific comment syntax
    /// where one exists, otherwise dropped.
    fn comment(&mut self, text: &str) -> Result<(), ExportError>;

    /// Retrieve the emitted script. Fails if a table is still open.
    fn finish(&mut self) -> Result<String, ExportError>;
}

/// Bookkeeping shared by the emitters: the open table and its column list.
#[derive(Default)]
pub(crate) struct TableScope {
    open: Option<(String, Vec<String>)>,
}

impl TableScope {
    pub(crate) fn open(&mut self, table: &str, columns: &[&str]) -> Result<(), ExportError> {
        if let Some((open, _)) = &self.open {
            return Err(ProtocolError::NestedTable {
                name: table.to_string(),
                open: open.clone(),
            }
            .into());
        }
        self.open = Some((
            table.to_string(),
            columns.iter().map(|c| (*c).to_string()).collect(),
        ));
        Ok(())
    }

    pub(crate) fn current(&self, values: usize) -> Result<(&str, &[String]), ExportError> {
        match &self.open {
            None => Err(ProtocolError::RowOutsideTable.into()),
            Some((table, columns)) => {
                if values != columns.len() {
                    return Err(ProtocolError::RowArity {
                        table: table.clone(),
                        expected: columns.len(),
                        got: values,
                    }
                    .into());
                }
                Ok((table.as_str(), columns.as_slice()))
            }
        }
    }

    pub(crate) fn close(&mut self) -> Result<(String, Vec<String>), ExportError> {
        self.open.take().ok_or_else(|| {
            ExportError::Protocol(ProtocolError::RowOutsideTable)
        })
    }

    pub(crate) fn ensure_closed(&self) -> Result<(), ExportError> {
        match &self.open {
            Some((table, _)) => Err(ProtocolError::UnterminatedTable {
                name: table.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}
