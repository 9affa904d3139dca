use std::error::Error;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tokio_postgres::Statement;
use tokio_postgres::types::{FromSql, Kind, Type};
use uuid::Uuid;

use super::numeric::PgNumeric;
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

/// Build a table using statement metadata for column names, so a query
/// with no rows still reports its columns.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_table(
    stmt: &Statement,
    rows: &[tokio_postgres::Row],
) -> Result<Table, ConnectorError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut table = Table::with_capacity(column_names, rows.len());
    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        table.push_row(row_values)?;
    }

    Ok(table)
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `ConnectorError::QueryError` if the value cannot be decoded.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, ConnectorError> {
    let column = &row.columns()[idx];
    let type_info = column.type_();

    let value = match *type_info {
        Type::INT2 => {
            let val: Option<i16> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v)))
        }
        Type::INT4 => {
            let val: Option<i32> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v)))
        }
        Type::INT8 => {
            let val: Option<i64> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Int)
        }
        Type::OID => {
            let val: Option<u32> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v)))
        }
        Type::FLOAT4 => {
            let val: Option<f32> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Float(f64::from(v)))
        }
        Type::FLOAT8 => {
            let val: Option<f64> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Float)
        }
        Type::BOOL => {
            let val: Option<bool> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Bool)
        }
        Type::TIMESTAMP => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Timestamp)
        }
        // reported in UTC
        Type::TIMESTAMPTZ => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc()))
        }
        Type::DATE => {
            let val: Option<NaiveDate> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| {
                RowValues::Timestamp(v.and_time(chrono::NaiveTime::MIN))
            })
        }
        Type::JSON | Type::JSONB => {
            let val: Option<Value> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::JSON)
        }
        Type::BYTEA => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Blob)
        }
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            let val: Option<String> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Text)
        }
        Type::NUMERIC => {
            let val: Option<PgNumeric> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Float(v.0))
        }
        Type::UUID => {
            let val: Option<Uuid> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Text(v.to_string()))
        }
        Type::TIME => {
            let val: Option<NaiveTime> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Text(v.to_string()))
        }
        // the single-byte "char" type
        Type::CHAR => {
            let val: Option<i8> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| {
                RowValues::Text(char::from(v.to_ne_bytes()[0]).to_string())
            })
        }
        Type::INTERVAL => {
            let val: Option<PgInterval> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Text(v.to_string()))
        }
        Type::INT2_ARRAY => json_array::<i16>(row, idx)?,
        Type::INT4_ARRAY => json_array::<i32>(row, idx)?,
        Type::INT8_ARRAY => json_array::<i64>(row, idx)?,
        Type::FLOAT4_ARRAY => json_array::<f32>(row, idx)?,
        Type::FLOAT8_ARRAY => json_array::<f64>(row, idx)?,
        Type::BOOL_ARRAY => json_array::<bool>(row, idx)?,
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => json_array::<String>(row, idx)?,
        // enums, citext and other types without a mapping
        _ => {
            let val: Option<RawValue> = row.try_get(idx)?;
            tracing::debug!(
                "column '{}' of type {type_info} read as raw value",
                column.name()
            );
            val.map_or(RowValues::Null, RawValue::into_row_value)
        }
    };
    Ok(value)
}

fn json_array<'a, T>(row: &'a tokio_postgres::Row, idx: usize) -> Result<RowValues, ConnectorError>
where
    T: FromSql<'a> + Into<Value>,
{
    let val: Option<Vec<Option<T>>> = row.try_get(idx)?;
    Ok(val.map_or(RowValues::Null, |v| RowValues::JSON(Value::from(v))))
}

/// `interval` as months, days and microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgInterval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl<'a> FromSql<'a> for PgInterval {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let bytes: [u8; 16] = raw
            .try_into()
            .map_err(|_| format!("interval has {} bytes, expected 16", raw.len()))?;
        let [m0, m1, m2, m3, m4, m5, m6, m7, d0, d1, d2, d3, n0, n1, n2, n3] = bytes;
        Ok(PgInterval {
            micros: i64::from_be_bytes([m0, m1, m2, m3, m4, m5, m6, m7]),
            days: i32::from_be_bytes([d0, d1, d2, d3]),
            months: i32::from_be_bytes([n0, n1, n2, n3]),
        })
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

/// Printed the way `psql` shows intervals, e.g. `1 year 2 mons 3 days 04:05:06`.
impl std::fmt::Display for PgInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        let (years, months) = (self.months / 12, self.months % 12);
        if years != 0 {
            parts.push(format!("{years} year{}", if years.abs() == 1 { "" } else { "s" }));
        }
        if months != 0 {
            parts.push(format!("{months} mon{}", if months.abs() == 1 { "" } else { "s" }));
        }
        if self.days != 0 {
            parts.push(format!("{} day{}", self.days, if self.days.abs() == 1 { "" } else { "s" }));
        }
        if self.micros != 0 || parts.is_empty() {
            let sign = if self.micros < 0 { "-" } else { "" };
            let total = self.micros.unsigned_abs();
            let secs = total / 1_000_000;
            let frac = total % 1_000_000;
            let mut clock = format!("{sign}{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60);
            if frac != 0 {
                clock.push_str(format!(".{frac:06}").trim_end_matches('0'));
            }
            parts.push(clock);
        }
        f.write_str(&parts.join(" "))
    }
}

/// Any column value in its binary wire form. Text-like types (enums,
/// domains over text, extension types such as `citext`) come out as text,
/// everything else as bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    text_like: bool,
    bytes: Vec<u8>,
}

impl RawValue {
    fn into_row_value(self) -> RowValues {
        if self.text_like {
            match String::from_utf8(self.bytes) {
                Ok(text) => RowValues::Text(text),
                Err(e) => RowValues::Blob(e.into_bytes()),
            }
        } else {
            RowValues::Blob(self.bytes)
        }
    }
}

impl<'a> FromSql<'a> for RawValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let text_like = matches!(ty.kind(), Kind::Enum(_))
            || matches!(ty.kind(), Kind::Domain(base) if <String as FromSql>::accepts(base))
            || <String as FromSql>::accepts(ty);
        Ok(RawValue {
            text_like,
            bytes: raw.to_vec(),
        })
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}
