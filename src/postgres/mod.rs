// PostgreSQL module - provides PostgreSQL-specific database functionality
//
// This module is split into several sub-modules for better organization:
// - config: Connection setup and the session type
// - numeric: Binary `numeric` encoding and decoding
// - params: Parameter conversion between connector and PostgreSQL types
// - query: Result extraction and building

pub mod config;
pub mod numeric;
pub mod params;
pub mod query;

use crate::error::ConnectorError;

pub use config::PostgresSession;
pub use params::Params;
pub use query::build_table;

impl From<tokio_postgres::Error> for ConnectorError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return ConnectorError::ConnectionError(format!("PostgreSQL error: {err}"));
        }
        match err.as_db_error() {
            Some(db_err) => ConnectorError::QueryError(format!(
                "PostgreSQL error: {} ({})",
                db_err.message(),
                db_err.code().code()
            )),
            None => ConnectorError::QueryError(format!("PostgreSQL error: {err}")),
        }
    }
}
