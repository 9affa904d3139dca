use rusqlite::Connection;

use super::params::Params;
use super::query::build_table;
use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

/// An open `SQLite` database.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Open the database file named by `config.database`. URIs such as
    /// `file::memory:?cache=shared` are accepted. A missing file is created,
    /// but its parent directory must exist.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the file cannot be opened or is not a database.
    pub fn open(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let path = &config.database;
        let conn = Connection::open(path).map_err(|e| {
            ConnectorError::connection(format!("Failed to open SQLite database {path}: {e}"))
        })?;

        // Reading the schema forces SQLite to touch the file header.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|e| {
                ConnectorError::connection(format!("Failed to read SQLite database {path}: {e}"))
            })?;

        Ok(Self { conn })
    }

    /// Run a statement and collect its rows.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if preparation or execution fails.
    pub fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<Table, ConnectorError> {
        let mut stmt = self.conn.prepare(sql)?;
        build_table(&mut stmt, &Params::convert(params))
    }

    /// Run a statement that returns no rows.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if execution fails.
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, ConnectorError> {
        let converted = Params::convert(params);
        let rows = self
            .conn
            .execute(sql, rusqlite::params_from_iter(converted.as_values()))?;
        Ok(rows)
    }

    /// Run a script of statements without parameters.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), ConnectorError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Close the database handle.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if SQLite refuses to close.
    pub fn close(self) -> Result<(), ConnectorError> {
        self.conn.close().map_err(|(_, e)| {
            ConnectorError::connection(format!("Failed to close SQLite database: {e}"))
        })
    }
}
