mod display;
mod row;

use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::ConnectorError;
use crate::types::RowValues;

pub use row::TableRow;

/// The rows returned by a query, with their column names.
///
/// A table is built fresh for each query and has no link back to the
/// connection that produced it.
/// ```rust
/// use sql_connector::prelude::*;
///
/// let mut table = Table::new(vec!["person_name".to_string()]);
/// table.push_row(vec!["Alice".into()])?;
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.get(0, "person_name").and_then(RowValues::as_text), Some("Alice"));
/// # Ok::<(), ConnectorError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Table {
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
    rows: Vec<TableRow>,
}

impl Table {
    #[must_use]
    pub fn new(column_names: Vec<String>) -> Self {
        Self::with_capacity(column_names, 0)
    }

    #[must_use]
    pub fn with_capacity(column_names: Vec<String>, capacity: usize) -> Self {
        let column_index = Arc::new(row::build_column_index(&column_names));
        Self {
            column_names: Arc::new(column_names),
            column_index,
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if the row width differs from the column count.
    pub fn push_row(&mut self, values: Vec<RowValues>) -> Result<(), ConnectorError> {
        if values.len() != self.column_names.len() {
            return Err(ConnectorError::query(format!(
                "row has {} values but the table has {} columns",
                values.len(),
                self.column_names.len()
            )));
        }
        self.rows.push(TableRow {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index: Arc::clone(&self.column_index),
        });
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    /// Value at (`row`, `column`).
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&RowValues> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Every value of one column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&RowValues>> {
        let idx = *self.column_index.get(name)?;
        Some(self.rows.iter().map(|r| &r.values[idx]).collect())
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<TableRow> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a TableRow;
    type IntoIter = std::slice::Iter<'a, TableRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Table {
    type Item = TableRow;
    type IntoIter = std::vec::IntoIter<TableRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Serialized as an array of records, one object per row.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
