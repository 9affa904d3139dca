use std::error::Error;

use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use super::numeric::{write_numeric_f64, write_numeric_text};
use crate::types::RowValues;

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow a slice of `RowValues` as Postgres parameters
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let references = params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, ty: &Type) -> Result<T, Box<dyn Error + Sync + Send>> {
    T::try_from(value).map_err(|_| format!("integer {value} is out of range for {ty}").into())
}

impl ToSql for RowValues {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            // The server infers the narrowest integer type a placeholder
            // needs; bind to that width instead of always sending int8.
            RowValues::Int(i) => match *ty {
                Type::INT2 => narrow::<i16>(*i, ty)?.to_sql_checked(ty, out),
                Type::INT4 => narrow::<i32>(*i, ty)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql_checked(ty, out),
                Type::NUMERIC => {
                    write_numeric_text(&i.to_string(), out)?;
                    Ok(IsNull::No)
                }
                _ => (*i).to_sql_checked(ty, out),
            },
            RowValues::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql_checked(ty, out),
                Type::NUMERIC => {
                    write_numeric_f64(*f, out)?;
                    Ok(IsNull::No)
                }
                _ => (*f).to_sql_checked(ty, out),
            },
            RowValues::Text(s) => match *ty {
                Type::UUID => uuid::Uuid::parse_str(s)?.to_sql_checked(ty, out),
                _ => s.to_sql_checked(ty, out),
            },
            RowValues::Bool(b) => (*b).to_sql_checked(ty, out),
            RowValues::Timestamp(dt) => match *ty {
                Type::TIMESTAMPTZ => dt.and_utc().to_sql_checked(ty, out),
                Type::DATE => dt.date().to_sql_checked(ty, out),
                _ => dt.to_sql_checked(ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql_checked(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        // Only accept types we can properly handle
        match *ty {
            // Integer types
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            // Floating point types
            Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC => true,
            // Text types
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UUID => true,
            // Boolean type
            Type::BOOL => true,
            // Date/time types
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => true,
            // JSON types
            Type::JSON | Type::JSONB => true,
            // Binary data
            Type::BYTEA => true,
            // For any other type, we don't accept
            _ => false,
        }
    }

    to_sql_checked!();
}
