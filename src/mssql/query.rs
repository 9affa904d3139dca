use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tiberius::{ColumnData, FromSql};

use super::config::MssqlClient;
use super::params::bind_query_params;
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

/// Build a table from a SQL Server query execution. Only the first result
/// set is kept; later ones are drained and dropped. Statements without a
/// result set give an empty table with no columns.
///
/// # Errors
/// Returns `ConnectorError` if execution or value extraction fails.
pub async fn build_table(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<Table, ConnectorError> {
    let mut stream = bind_query_params(query, params).query(client).await?;

    let column_names: Vec<String> = stream
        .columns()
        .await?
        .map(|columns| columns.iter().map(|col| col.name().to_string()).collect())
        .unwrap_or_default();

    let rows = stream.into_first_result().await?;
    rows_to_table(column_names, rows)
}

/// Convert rows of one result set into a table.
///
/// # Errors
/// Returns `ConnectorError::QueryError` if a cell has no mapping or a row
/// does not match the header width.
pub fn rows_to_table<R>(
    column_names: Vec<String>,
    rows: impl IntoIterator<Item = R>,
) -> Result<Table, ConnectorError>
where
    R: IntoIterator<Item = ColumnData<'static>>,
{
    let col_count = column_names.len();
    let rows = rows.into_iter();
    let mut table = Table::with_capacity(column_names, rows.size_hint().0);
    for row in rows {
        let mut row_values = Vec::with_capacity(col_count);
        for data in row {
            row_values.push(column_data_to_value(data)?);
        }
        table.push_row(row_values)?;
    }
    Ok(table)
}

/// Map one SQL Server cell to a `RowValues`.
///
/// # Errors
/// Returns `ConnectorError::QueryError` for column types without a mapping.
#[allow(clippy::cast_precision_loss)]
pub fn column_data_to_value(data: ColumnData<'static>) -> Result<RowValues, ConnectorError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|n| RowValues::Int(i64::from(n))),
        ColumnData::I16(v) => v.map(|n| RowValues::Int(i64::from(n))),
        ColumnData::I32(v) => v.map(|n| RowValues::Int(i64::from(n))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|n| RowValues::Float(f64::from(n))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.map(|s| RowValues::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| RowValues::Blob(b.into_owned())),
        ColumnData::Xml(v) => v.map(|x| RowValues::Text((*x).to_string())),
        ColumnData::Numeric(v) => v.map(|n| {
            RowValues::Float(n.value() as f64 / 10_f64.powi(i32::from(n.scale())))
        }),
        ref other @ (ColumnData::DateTime(_)
        | ColumnData::SmallDateTime(_)
        | ColumnData::DateTime2(_)) => NaiveDateTime::from_sql(other)?.map(RowValues::Timestamp),
        ref other @ ColumnData::Date(_) => NaiveDate::from_sql(other)?
            .map(|d| RowValues::Timestamp(d.and_time(NaiveTime::MIN))),
        ref other @ ColumnData::Time(_) => {
            NaiveTime::from_sql(other)?.map(|t| RowValues::Text(t.to_string()))
        }
        // reported in UTC
        ref other @ ColumnData::DateTimeOffset(_) => DateTime::<Utc>::from_sql(other)?
            .map(|dt| RowValues::Timestamp(dt.naive_utc())),
        #[allow(unreachable_patterns)]
        other => {
            return Err(ConnectorError::query(format!(
                "unsupported SQL Server column type: {other:?}"
            )));
        }
    };
    Ok(value.unwrap_or(RowValues::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn nulls_of_any_type_become_null() {
        assert!(column_data_to_value(ColumnData::I32(None)).unwrap().is_null());
        assert!(column_data_to_value(ColumnData::String(None)).unwrap().is_null());
    }

    #[test]
    fn scalar_cells_map_to_row_values() {
        assert_eq!(
            column_data_to_value(ColumnData::I16(Some(8))).unwrap(),
            RowValues::Int(8)
        );
        assert_eq!(
            column_data_to_value(ColumnData::String(Some(Cow::Borrowed("Alice")))).unwrap(),
            RowValues::Text("Alice".into())
        );
        assert_eq!(
            column_data_to_value(ColumnData::Bit(Some(true))).unwrap(),
            RowValues::Bool(true)
        );
    }

    #[test]
    fn rows_fill_a_table_under_the_first_header() {
        let rows = vec![
            vec![ColumnData::I32(Some(8)), ColumnData::String(Some(Cow::Borrowed("Alice")))],
            vec![ColumnData::I32(Some(9)), ColumnData::String(None)],
        ];
        let table =
            rows_to_table(vec!["person_number".into(), "person_name".into()], rows).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "person_number"), Some(&RowValues::Int(9)));
        assert!(table.get(1, "person_name").is_some_and(RowValues::is_null));
    }

    #[test]
    fn rows_of_a_different_shape_are_rejected() {
        // a row from a second result set with a wider header
        let rows = vec![vec![ColumnData::I32(Some(2)), ColumnData::I32(Some(3))]];
        let err = rows_to_table(vec!["a".into()], rows).unwrap_err();
        assert!(matches!(err, ConnectorError::QueryError(_)));
    }

    #[test]
    fn no_result_set_gives_an_empty_table() {
        let table = rows_to_table(Vec::new(), Vec::<Vec<ColumnData<'static>>>::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }
}
