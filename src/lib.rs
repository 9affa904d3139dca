//! Read connection settings from an env-style file and run parameterized
//! SQL against PostgreSQL, SQL Server or SQLite, getting the rows back as a
//! [`Table`].
//!
//! ```rust,no_run
//! use sql_connector::prelude::*;
//!
//! let mut connector = Connector::from_env_file(".env")?;
//! let people = connector.query("SELECT person_name FROM persons WHERE person_number = ?", &[8.into()])?;
//! for row in &people {
//!     println!("{:?}", row.get("person_name"));
//! }
//! # Ok::<(), ConnectorError>(())
//! ```
//!
//! Backends are behind the `sqlite`, `postgres` and `mssql` cargo features
//! (all on by default). The optional `polars` feature adds
//! `Table::to_dataframe`.

pub mod config;
pub mod connector;
#[cfg(feature = "polars")]
pub mod dataframe;
pub mod error;
pub mod placeholders;
pub mod prelude;
pub mod session;
pub mod table;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{ConnectorConfig, ConnectorConfigBuilder, ServerAddress};
pub use connector::Connector;
pub use error::{ConnectorError, ErrorKind};
pub use placeholders::{PlaceholderStyle, prepare_statement, translate_placeholders};
pub use table::{Table, TableRow};
pub use types::{DatabaseType, RowValues};
