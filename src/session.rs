use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "mssql")]
use crate::mssql::MssqlSession;
#[cfg(feature = "postgres")]
use crate::postgres::PostgresSession;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteSession;

/// One open backend session. SQL reaching these methods is already in the
/// backend's native placeholder style.
#[derive(Debug)]
pub enum Session {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteSession),
    #[cfg(feature = "postgres")]
    Postgres(PostgresSession),
    #[cfg(feature = "mssql")]
    Mssql(MssqlSession),
}

impl Session {
    /// Open a session for `config.db_type`.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the backend cannot be reached, or
    /// `ConnectorError::ConfigError` if its support is not compiled in.
    pub fn open(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        match config.db_type {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => Ok(Session::Sqlite(SqliteSession::open(config)?)),
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => Ok(Session::Postgres(PostgresSession::open(config)?)),
            #[cfg(feature = "mssql")]
            DatabaseType::Mssql => Ok(Session::Mssql(MssqlSession::open(config)?)),
            #[allow(unreachable_patterns)]
            other => Err(ConnectorError::config(format!(
                "support for {other} is not compiled in"
            ))),
        }
    }

    /// # Errors
    /// Returns an error if the backend rejects or fails the statement.
    pub fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<Table, ConnectorError> {
        match self {
            #[cfg(feature = "sqlite")]
            Session::Sqlite(session) => session.query(sql, params),
            #[cfg(feature = "postgres")]
            Session::Postgres(session) => session.query(sql, params),
            #[cfg(feature = "mssql")]
            Session::Mssql(session) => session.query(sql, params),
        }
    }

    /// # Errors
    /// Returns an error if the backend rejects or fails the statement.
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, ConnectorError> {
        match self {
            #[cfg(feature = "sqlite")]
            Session::Sqlite(session) => session.execute(sql, params),
            #[cfg(feature = "postgres")]
            Session::Postgres(session) => session.execute(sql, params),
            #[cfg(feature = "mssql")]
            Session::Mssql(session) => session.execute(sql, params),
        }
    }

    /// # Errors
    /// Returns an error if any statement in the batch fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), ConnectorError> {
        match self {
            #[cfg(feature = "sqlite")]
            Session::Sqlite(session) => session.execute_batch(sql),
            #[cfg(feature = "postgres")]
            Session::Postgres(session) => session.execute_batch(sql),
            #[cfg(feature = "mssql")]
            Session::Mssql(session) => session.execute_batch(sql),
        }
    }

    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the backend reports a failure while closing.
    pub fn close(self) -> Result<(), ConnectorError> {
        match self {
            #[cfg(feature = "sqlite")]
            Session::Sqlite(session) => session.close(),
            #[cfg(feature = "postgres")]
            Session::Postgres(session) => session.close(),
            #[cfg(feature = "mssql")]
            Session::Mssql(session) => session.close(),
        }
    }
}
