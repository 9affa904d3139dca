use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::ConnectorError;

/// Values that can be stored in a result cell or bound as a query parameter.
///
/// The same enum is used for every backend, so calling code never branches on
/// driver types:
/// ```rust
/// use sql_connector::prelude::*;
///
/// let params: Vec<RowValues> = vec![8.into(), "Alice".into(), RowValues::Null];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// SQLite and SQL Server hand booleans back as 0/1 integers, so those are
    /// accepted too.
    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // SQLite stores timestamps as text
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let RowValues::JSON(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

impl fmt::Display for RowValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValues::Int(i) => write!(f, "{i}"),
            RowValues::Float(v) => write!(f, "{v}"),
            RowValues::Text(s) => f.write_str(s),
            RowValues::Bool(b) => write!(f, "{b}"),
            RowValues::Timestamp(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            RowValues::Null => f.write_str("NULL"),
            RowValues::JSON(v) => write!(f, "{v}"),
            RowValues::Blob(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// The kind of data source a connector talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// `PostgreSQL` database
    #[value(alias = "postgresql")]
    Postgres,
    /// SQL Server database
    #[value(alias = "sqlserver")]
    Mssql,
    /// `SQLite` database file
    Sqlite,
}

impl DatabaseType {
    /// Name used in connection targets and log lines.
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            DatabaseType::Postgres => "postgresql",
            DatabaseType::Mssql => "mssql",
            DatabaseType::Sqlite => "sqlite",
        }
    }

    /// Whether server, username and password must be configured.
    #[must_use]
    pub fn is_networked(self) -> bool {
        !matches!(self, DatabaseType::Sqlite)
    }

    #[must_use]
    pub fn default_port(self) -> Option<u16> {
        match self {
            DatabaseType::Postgres => Some(5432),
            DatabaseType::Mssql => Some(1433),
            DatabaseType::Sqlite => None,
        }
    }

    /// Whether support for this backend was compiled in.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        match self {
            DatabaseType::Postgres => cfg!(feature = "postgres"),
            DatabaseType::Mssql => cfg!(feature = "mssql"),
            DatabaseType::Sqlite => cfg!(feature = "sqlite"),
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for DatabaseType {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(DatabaseType::Postgres),
            "mssql" | "sqlserver" => Ok(DatabaseType::Mssql),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            other => Err(ConnectorError::ConfigError(format!(
                "unsupported database type: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_type_parses_aliases() {
        assert_eq!("postgresql".parse::<DatabaseType>().unwrap(), DatabaseType::Postgres);
        assert_eq!("PG".parse::<DatabaseType>().unwrap(), DatabaseType::Postgres);
        assert_eq!(" MSSQL ".parse::<DatabaseType>().unwrap(), DatabaseType::Mssql);
        assert_eq!("sqlite3".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
    }

    #[test]
    fn unknown_database_type_is_config_error() {
        let err = "oracle".parse::<DatabaseType>().unwrap_err();
        assert!(matches!(err, ConnectorError::ConfigError(ref m) if m.contains("oracle")));
    }

    #[test]
    fn conversions_into_row_values() {
        assert_eq!(RowValues::from(8), RowValues::Int(8));
        assert_eq!(RowValues::from("Alice"), RowValues::Text("Alice".into()));
        assert_eq!(RowValues::from(None::<i64>), RowValues::Null);
        assert_eq!(RowValues::from(Some(2.5)), RowValues::Float(2.5));
    }

    #[test]
    fn as_json_only_matches_json_cells() {
        let v = RowValues::JSON(serde_json::json!({"team": "blue"}));
        assert_eq!(v.as_json().and_then(|j| j.get("team")), Some(&serde_json::json!("blue")));
        assert_eq!(RowValues::Text("{}".into()).as_json(), None);
    }

    #[test]
    fn as_bool_accepts_integer_flags() {
        assert_eq!(RowValues::Int(1).as_bool(), Some(&true));
        assert_eq!(RowValues::Int(0).as_bool(), Some(&false));
        assert_eq!(RowValues::Int(2).as_bool(), None);
    }

    #[test]
    fn as_timestamp_parses_sqlite_text() {
        let v = RowValues::Text("2024-01-02 03:04:05".into());
        let dt = v.as_timestamp().unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn display_renders_blobs_as_hex() {
        assert_eq!(RowValues::Blob(vec![0xde, 0xad]).to_string(), "0xdead");
        assert_eq!(RowValues::Null.to_string(), "NULL");
    }
}
