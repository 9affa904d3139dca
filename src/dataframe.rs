use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

/// Pick a dtype from the non-null values of one column.
fn column_kind<'a>(values: impl Iterator<Item = &'a RowValues>) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let this = match value {
            RowValues::Null => continue,
            RowValues::Int(_) => ColumnKind::Int,
            RowValues::Float(_) => ColumnKind::Float,
            RowValues::Bool(_) => ColumnKind::Bool,
            _ => return ColumnKind::Text,
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Int | ColumnKind::Float), ColumnKind::Int | ColumnKind::Float) => {
                ColumnKind::Float
            }
            _ => return ColumnKind::Text,
        });
    }
    kind.unwrap_or(ColumnKind::Text)
}

fn text_cell(value: &RowValues) -> Option<String> {
    match value {
        RowValues::Null => None,
        RowValues::Timestamp(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        other => Some(other.to_string()),
    }
}

impl Table {
    /// Convert into a polars `DataFrame`, one column per table column.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if polars rejects the columns.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_dataframe(&self) -> Result<DataFrame, ConnectorError> {
        let mut columns = Vec::with_capacity(self.column_count());
        for (idx, name) in self.columns().iter().enumerate() {
            let cells = self.rows().iter().map(move |row| &row.values()[idx]);
            let name = name.as_str().into();
            let series = match column_kind(cells.clone()) {
                ColumnKind::Int => {
                    let data: Vec<Option<i64>> = cells.map(|v| v.as_int().copied()).collect();
                    Series::new(name, data)
                }
                ColumnKind::Float => {
                    let data: Vec<Option<f64>> = cells
                        .map(|v| match v {
                            RowValues::Int(i) => Some(*i as f64),
                            other => other.as_float(),
                        })
                        .collect();
                    Series::new(name, data)
                }
                ColumnKind::Bool => {
                    let data: Vec<Option<bool>> = cells.map(|v| v.as_bool().copied()).collect();
                    Series::new(name, data)
                }
                ColumnKind::Text => {
                    let data: Vec<Option<String>> = cells.map(text_cell).collect();
                    Series::new(name, data)
                }
            };
            columns.push(Column::from(series));
        }
        DataFrame::new(columns)
            .map_err(|e| ConnectorError::query(format!("cannot build DataFrame: {e}")))
    }
}
