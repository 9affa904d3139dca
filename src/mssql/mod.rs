// MSSQL module - provides SQL Server-specific database functionality
//
// This module is split into several sub-modules for better organization:
// - config: Connection setup and the session type
// - params: Parameter binding between connector and SQL Server types
// - query: Result extraction and building

pub mod config;
pub mod params;
pub mod query;

use crate::error::ConnectorError;

pub use config::{MssqlClient, MssqlSession};
pub use params::bind_query_params;
pub use query::build_table;

impl From<tiberius::error::Error> for ConnectorError {
    fn from(err: tiberius::error::Error) -> Self {
        match err {
            tiberius::error::Error::Io { .. }
            | tiberius::error::Error::Tls(_)
            | tiberius::error::Error::Routing { .. } => {
                ConnectorError::ConnectionError(format!("SQL Server error: {err}"))
            }
            other => ConnectorError::QueryError(format!("SQL Server error: {other}")),
        }
    }
}
