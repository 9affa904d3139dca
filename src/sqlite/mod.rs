// SQLite module - provides SQLite-specific database functionality
//
// This module is split into several sub-modules for better organization:
// - config: Opening the database file and the session type
// - params: Parameter conversion between connector and SQLite types
// - query: Statement execution and result extraction

pub mod config;
pub mod params;
pub mod query;

use rusqlite::ErrorCode;

use crate::error::ConnectorError;

pub use config::SqliteSession;
pub use params::Params;
pub use query::build_table;

/// Failures to reach the file map to connection errors; everything else is
/// the statement's fault.
impl From<rusqlite::Error> for ConnectorError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(e.code, ErrorCode::CannotOpen | ErrorCode::NotADatabase) =>
            {
                ConnectorError::ConnectionError(format!("SQLite error: {err}"))
            }
            _ => ConnectorError::QueryError(format!("SQLite error: {err}")),
        }
    }
}
