use rusqlite::Statement;
use rusqlite::types::Value;

use super::params::Params;
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `ConnectorError` if the value cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, ConnectorError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Build a table from a prepared `SQLite` statement.
///
/// Statements without result columns (DML, DDL) still run and produce an
/// empty table with no columns.
///
/// # Errors
/// Returns `ConnectorError::QueryError` if execution or value extraction fails.
pub fn build_table(stmt: &mut Statement, params: &Params) -> Result<Table, ConnectorError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut table = Table::with_capacity(column_names, 16);
    let mut rows_iter = stmt.query(rusqlite::params_from_iter(params.as_values()))?;

    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        table.push_row(row_values)?;
    }

    Ok(table)
}
