use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

use super::params::Params;
use super::query::build_table;
use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

/// A live PostgreSQL session. Owns the single-threaded runtime that drives
/// its connection task.
pub struct PostgresSession {
    runtime: Runtime,
    client: Client,
    connection: JoinHandle<()>,
}

impl std::fmt::Debug for PostgresSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSession")
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl PostgresSession {
    /// Connect and run a smoke query.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the server cannot be reached or rejects the login.
    pub fn open(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let address = config.address()?;

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&address.host)
            .dbname(&config.database)
            .user(config.username.as_deref().unwrap_or_default())
            .password(config.password.as_deref().unwrap_or_default());
        if let Some(port) = address.port {
            pg_config.port(port);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConnectorError::connection(format!("Failed to start runtime: {e}")))?;

        let (client, connection) = runtime
            .block_on(pg_config.connect(NoTls))
            .map_err(|e| {
                ConnectorError::connection(format!(
                    "Failed to connect to {}: {e}",
                    config.target()
                ))
            })?;

        let connection = runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("postgres connection ended with error: {e}");
            }
        });

        runtime
            .block_on(client.simple_query("SELECT 1"))
            .map_err(|e| ConnectorError::connection(format!("Connection check failed: {e}")))?;

        Ok(Self {
            runtime,
            client,
            connection,
        })
    }

    /// Prepare `sql`, run it and collect the rows.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if preparation, binding or execution fails.
    pub fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<Table, ConnectorError> {
        let Self { runtime, client, .. } = self;
        runtime.block_on(async {
            let stmt = client.prepare(sql).await?;
            let converted = Params::convert(params);
            let rows = client.query(&stmt, converted.as_refs()).await?;
            build_table(&stmt, &rows)
        })
    }

    /// # Errors
    /// Returns `ConnectorError::QueryError` if execution fails.
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, ConnectorError> {
        let Self { runtime, client, .. } = self;
        let converted = Params::convert(params);
        let rows = runtime.block_on(client.execute(sql, converted.as_refs()))?;
        usize::try_from(rows).map_err(|e| {
            ConnectorError::query(format!("postgres affected rows conversion error: {e}"))
        })
    }

    /// # Errors
    /// Returns `ConnectorError::QueryError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), ConnectorError> {
        let Self { runtime, client, .. } = self;
        runtime.block_on(client.batch_execute(sql))?;
        Ok(())
    }

    /// Drop the client, then wait for the connection task so the server
    /// receives a clean terminate message before the runtime goes away.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the connection task panicked.
    pub fn close(self) -> Result<(), ConnectorError> {
        let Self {
            runtime,
            client,
            connection,
        } = self;
        drop(client);
        finish_connection(runtime, connection)
    }
}

fn finish_connection(runtime: Runtime, connection: JoinHandle<()>) -> Result<(), ConnectorError> {
    let joined = runtime.block_on(connection);
    runtime.shutdown_background();
    joined.map_err(|e| ConnectorError::connection(format!("postgres connection task failed: {e}")))
}
