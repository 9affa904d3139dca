use tiberius::{AuthMethod, Client, Config as TiberiusConfig, SqlBrowser};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::params::bind_query_params;
use super::query::build_table;
use crate::config::{ConnectorConfig, ServerAddress};
use crate::error::ConnectorError;
use crate::table::Table;
use crate::types::RowValues;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// A live SQL Server session on its own single-threaded runtime.
pub struct MssqlSession {
    runtime: Runtime,
    client: MssqlClient,
}

impl std::fmt::Debug for MssqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlSession").finish_non_exhaustive()
    }
}

fn build_tiberius_config(config: &ConnectorConfig, address: &ServerAddress) -> TiberiusConfig {
    let mut tib = TiberiusConfig::new();
    tib.host(&address.host);
    if let Some(port) = address.port {
        tib.port(port);
    }
    if let Some(instance) = &address.instance_name {
        tib.instance_name(instance);
    }
    tib.database(&config.database);
    tib.authentication(AuthMethod::sql_server(
        config.username.as_deref().unwrap_or_default(),
        config.password.as_deref().unwrap_or_default(),
    ));
    // server certificates are not verified
    tib.trust_cert();
    tib
}

async fn create_mssql_client(
    tib: TiberiusConfig,
    address: &ServerAddress,
) -> Result<MssqlClient, ConnectorError> {
    let tcp = if address.instance_name.is_some() && address.port.is_none() {
        // the SQL Browser service tells us the instance's port
        TcpStream::connect_named(&tib).await.map_err(|e| {
            ConnectorError::connection(format!("SQL Browser lookup failed: {e}"))
        })?
    } else {
        TcpStream::connect(tib.get_addr())
            .await
            .map_err(|e| ConnectorError::connection(format!("TCP connection error: {e}")))?
    };
    tcp.set_nodelay(true)
        .map_err(|e| ConnectorError::connection(format!("TCP configuration error: {e}")))?;

    Client::connect(tib, tcp.compat_write())
        .await
        .map_err(|e| ConnectorError::connection(format!("SQL Server connection error: {e}")))
}

impl MssqlSession {
    /// Connect and run a smoke query.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the server cannot be reached or rejects the login.
    pub fn open(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let address = config.address()?;
        let tib = build_tiberius_config(config, &address);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConnectorError::connection(format!("Failed to start runtime: {e}")))?;

        let client = runtime.block_on(async {
            let mut client = create_mssql_client(tib, &address).await?;
            client
                .simple_query("SELECT 1")
                .await
                .map_err(|e| ConnectorError::connection(format!("Connection check failed: {e}")))?
                .into_results()
                .await
                .map_err(|e| ConnectorError::connection(format!("Connection check failed: {e}")))?;
            Ok::<_, ConnectorError>(client)
        })?;

        Ok(Self { runtime, client })
    }

    /// Run `sql` with bound parameters and collect the first result set.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` if execution or value extraction fails.
    pub fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<Table, ConnectorError> {
        let Self { runtime, client } = self;
        runtime.block_on(build_table(client, sql, params))
    }

    /// # Errors
    /// Returns `ConnectorError::QueryError` if execution fails.
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, ConnectorError> {
        let Self { runtime, client } = self;
        let exec_result = runtime.block_on(bind_query_params(sql, params).execute(client))?;
        let rows_affected: u64 = exec_result.rows_affected().iter().sum();
        usize::try_from(rows_affected)
            .map_err(|e| ConnectorError::query(format!("Invalid rows affected count: {e}")))
    }

    /// # Errors
    /// Returns `ConnectorError::QueryError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), ConnectorError> {
        let Self { runtime, client } = self;
        runtime.block_on(async {
            client.simple_query(sql).await?.into_results().await?;
            Ok(())
        })
    }

    /// # Errors
    /// Returns `ConnectorError::ConnectionError` if the logout handshake fails.
    pub fn close(self) -> Result<(), ConnectorError> {
        let Self { runtime, client } = self;
        runtime
            .block_on(client.close())
            .map_err(|e| ConnectorError::connection(format!("Failed to close SQL Server session: {e}")))
    }
}
