//! Connection settings and where they come from.
//!
//! Settings are a handful of `CONNECTOR_DB_*` keys, normally kept in an
//! env-style file:
//!
//! ```text
//! CONNECTOR_DB_TYPE=postgresql
//! CONNECTOR_DB_SERVER=db.internal:5432
//! CONNECTOR_DB_DATABASE=people
//! CONNECTOR_DB_USERNAME=reader
//! CONNECTOR_DB_PASSWORD=secret
//! ```

mod address;
mod builder;
mod env_file;

use std::fmt;

use crate::error::ConnectorError;
use crate::types::DatabaseType;

pub use address::ServerAddress;
pub use builder::ConnectorConfigBuilder;
pub use env_file::read_env_file;

pub const KEY_DB_TYPE: &str = "CONNECTOR_DB_TYPE";
pub const KEY_DB_SERVER: &str = "CONNECTOR_DB_SERVER";
pub const KEY_DB_PORT: &str = "CONNECTOR_DB_PORT";
pub const KEY_DB_DATABASE: &str = "CONNECTOR_DB_DATABASE";
pub const KEY_DB_USERNAME: &str = "CONNECTOR_DB_USERNAME";
pub const KEY_DB_PASSWORD: &str = "CONNECTOR_DB_PASSWORD";
pub const KEY_DB_DRIVER: &str = "CONNECTOR_DB_DRIVER";

/// Every key the connector reads.
pub const RECOGNIZED_KEYS: [&str; 7] = [
    KEY_DB_TYPE,
    KEY_DB_SERVER,
    KEY_DB_PORT,
    KEY_DB_DATABASE,
    KEY_DB_USERNAME,
    KEY_DB_PASSWORD,
    KEY_DB_DRIVER,
];

/// Settings for one data source.
///
/// For `SQLite`, `database` is the file path (or `:memory:`) and the
/// server/credential fields are ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub db_type: DatabaseType,
    /// Server as written in the settings; may carry a port or instance.
    pub server: Option<String>,
    /// Explicit port; wins over a port embedded in `server`.
    pub port: Option<u16>,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Client driver name. Kept for SQL Server settings written for ODBC;
    /// the native driver does not use it.
    pub driver: Option<String>,
}

impl ConnectorConfig {
    /// Settings for a `SQLite` database file.
    ///
    /// A file that does not exist yet is created empty when the connector
    /// opens it, so a mistyped path shows up later as a missing-table
    /// `QueryError` rather than a connection failure.
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            server: None,
            port: None,
            database: path.into(),
            username: None,
            password: None,
            driver: None,
        }
    }

    #[must_use]
    pub fn postgres(
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::networked(DatabaseType::Postgres, server, database, username, password)
    }

    #[must_use]
    pub fn mssql(
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::networked(DatabaseType::Mssql, server, database, username, password)
    }

    fn networked(
        db_type: DatabaseType,
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            db_type,
            server: Some(server.into()),
            port: None,
            database: database.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            driver: None,
        }
    }

    #[must_use]
    pub fn builder(db_type: DatabaseType) -> ConnectorConfigBuilder {
        ConnectorConfigBuilder::new(db_type)
    }

    /// Build settings from a key lookup, such as a parsed env file.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` if a required key is missing or a value is invalid.
    pub fn from_settings<F>(lookup: F) -> Result<Self, ConnectorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    tracing::info!("setting '{key}' not found");
                    ConnectorError::config(format!("required setting '{key}' not found"))
                })
        };

        let db_type: DatabaseType = require(KEY_DB_TYPE)?.parse()?;
        let database = require(KEY_DB_DATABASE)?;

        let mut config = if db_type.is_networked() {
            let password = lookup(KEY_DB_PASSWORD).ok_or_else(|| {
                ConnectorError::config(format!("required setting '{KEY_DB_PASSWORD}' not found"))
            })?;
            Self::networked(
                db_type,
                require(KEY_DB_SERVER)?,
                database,
                require(KEY_DB_USERNAME)?,
                password,
            )
        } else {
            Self::sqlite(database)
        };

        config.port = lookup(KEY_DB_PORT)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(|p| address::parse_port(&p))
            .transpose()?;
        if db_type == DatabaseType::Mssql {
            config.driver = lookup(KEY_DB_DRIVER).filter(|d| !d.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that everything needed to connect is present.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` naming the first problem found.
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if !self.db_type.is_enabled() {
            return Err(ConnectorError::config(format!(
                "support for {} is not enabled in this build",
                self.db_type
            )));
        }
        if self.database.trim().is_empty() {
            return Err(ConnectorError::config("database is required"));
        }
        if self.db_type.is_networked() {
            self.address()?;
            if self.username.as_deref().is_none_or(|u| u.trim().is_empty()) {
                return Err(ConnectorError::config("username is required"));
            }
            if self.password.is_none() {
                return Err(ConnectorError::config("password is required"));
            }
        }
        Ok(())
    }

    /// Resolved host, port and instance. The port falls back to the
    /// backend's default.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` if the server is missing or malformed.
    pub fn address(&self) -> Result<ServerAddress, ConnectorError> {
        let raw = self
            .server
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConnectorError::config("server is required"))?;
        let mut address = ServerAddress::parse(raw, self.db_type)?;
        // a named instance's port comes from the SQL Browser
        let default_port = if address.instance_name.is_some() {
            None
        } else {
            self.db_type.default_port()
        };
        address.port = self.port.or(address.port).or(default_port);
        Ok(address)
    }

    /// Password-free description of the target, for logs and error messages.
    #[must_use]
    pub fn target(&self) -> String {
        if !self.db_type.is_networked() {
            return format!("sqlite://{}", self.database);
        }
        let user = self.username.as_deref().unwrap_or_default();
        match self.address() {
            Ok(addr) => {
                let host = match &addr.instance_name {
                    Some(instance) => format!("{}\\{instance}", addr.host),
                    None => addr.host.clone(),
                };
                let port = addr.port.map(|p| format!(":{p}")).unwrap_or_default();
                format!("{}://{user}@{host}{port}/{}", self.db_type, self.database)
            }
            Err(_) => format!(
                "{}://{user}@{}/{}",
                self.db_type,
                self.server.as_deref().unwrap_or_default(),
                self.database
            ),
        }
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("db_type", &self.db_type)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("driver", &self.driver)
            .finish()
    }
}
