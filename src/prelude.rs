//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{ConnectorConfig, ConnectorConfigBuilder, ServerAddress};
pub use crate::connector::Connector;
pub use crate::error::{ConnectorError, ErrorKind};
pub use crate::placeholders::{
    PlaceholderScan, PlaceholderStyle, prepare_statement, scan_placeholders,
    translate_placeholders,
};
pub use crate::table::{Table, TableRow};
pub use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "polars")]
pub use polars::prelude::DataFrame;
