use std::path::Path;

use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::placeholders::prepare_statement;
use crate::session::Session;
use crate::table::Table;
use crate::types::{DatabaseType, RowValues};

/// A connection to one database, opened from validated settings.
///
/// Statements may use `?` placeholders on every backend; they are rewritten
/// to the backend's native style before execution. The connector is
/// blocking and is not meant to be shared between threads.
///
/// ```rust,no_run
/// use sql_connector::prelude::*;
///
/// let mut connector = Connector::from_env_file(".env")?;
/// let table = connector.query(
///     "SELECT person_name FROM persons WHERE person_number = ?",
///     &[8.into()],
/// )?;
/// println!("{table}");
/// connector.close()?;
/// # Ok::<(), ConnectorError>(())
/// ```
#[derive(Debug)]
pub struct Connector {
    config: ConnectorConfig,
    session: Option<Session>,
}

impl Connector {
    /// Read settings from `path` and connect.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` for unusable settings, or
    /// `ConnectorError::ConnectionError` if the database cannot be reached.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let config = ConnectorConfig::from_env_file(path)?;
        Self::connect(config)
    }

    /// Validate `config` and open a session.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` for unusable settings, or
    /// `ConnectorError::ConnectionError` if the database cannot be reached.
    pub fn connect(config: ConnectorConfig) -> Result<Self, ConnectorError> {
        config.validate()?;
        let target = config.target();
        tracing::info!("creating connection to {target}");
        let session = match Session::open(&config) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("connection to {target} failed: {e}");
                return Err(e);
            }
        };
        tracing::info!("connection to {target} established");
        Ok(Self {
            config,
            session: Some(session),
        })
    }

    /// Run a statement and return its rows. Statements that produce no
    /// result set return an empty table with no columns.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if the parameters do not match the
    /// placeholders or the database rejects the statement, and
    /// `ConnectorError::ConnectionError` if the connector is closed.
    pub fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<Table, ConnectorError> {
        let db_type = self.config.db_type;
        let session = self.session_mut()?;
        let sql = prepare_statement(sql, db_type.into(), params.len())?;
        tracing::debug!(params = params.len(), "query: {sql}");
        session.query(&sql, params)
    }

    /// Run a statement and return the number of affected rows.
    ///
    /// # Errors
    /// Same conditions as [`Connector::query`].
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, ConnectorError> {
        let db_type = self.config.db_type;
        let session = self.session_mut()?;
        let sql = prepare_statement(sql, db_type.into(), params.len())?;
        tracing::debug!(params = params.len(), "execute: {sql}");
        session.execute(&sql, params)
    }

    /// Run several statements separated by `;`, without parameters.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if a statement fails, and
    /// `ConnectorError::ConnectionError` if the connector is closed.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), ConnectorError> {
        tracing::debug!("execute_batch: {sql}");
        self.session_mut()?.execute_batch(sql)
    }

    /// Close the session. Closing twice is a no-op.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the backend reports a failure while closing.
    pub fn close(&mut self) -> Result<(), ConnectorError> {
        match self.session.take() {
            Some(session) => {
                tracing::info!("closing connection to {}", self.config.target());
                session.close()
            }
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.config.db_type
    }

    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    fn session_mut(&mut self) -> Result<&mut Session, ConnectorError> {
        self.session
            .as_mut()
            .ok_or_else(|| ConnectorError::connection("connector is closed"))
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("error while closing connection: {e}");
        }
    }
}
