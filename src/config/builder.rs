use super::ConnectorConfig;
use crate::error::ConnectorError;
use crate::types::DatabaseType;

/// Fluent builder for [`ConnectorConfig`].
///
/// ```rust
/// use sql_connector::prelude::*;
///
/// let config = ConnectorConfig::builder(DatabaseType::Sqlite)
///     .database(":memory:")
///     .build()?;
/// assert_eq!(config.target(), "sqlite://:memory:");
/// # Ok::<(), ConnectorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConnectorConfigBuilder {
    config: ConnectorConfig,
}

impl ConnectorConfigBuilder {
    #[must_use]
    pub fn new(db_type: DatabaseType) -> Self {
        let mut config = ConnectorConfig::sqlite(String::new());
        config.db_type = db_type;
        Self { config }
    }

    #[must_use]
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = Some(server.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.config.driver = Some(driver.into());
        self
    }

    /// Return the settings without validating them.
    #[must_use]
    pub fn finish(self) -> ConnectorConfig {
        self.config
    }

    /// Validate and return the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::ConfigError` if a required field is missing.
    pub fn build(self) -> Result<ConnectorConfig, ConnectorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_validates() {
        let err = ConnectorConfigBuilder::new(DatabaseType::Sqlite)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConnectorError::ConfigError(ref m) if m.contains("database")));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn networked_fields() {
        let config = ConnectorConfig::builder(DatabaseType::Postgres)
            .server("localhost")
            .port(6543)
            .database("people")
            .username("reader")
            .password("")
            .build()
            .unwrap();
        assert_eq!(config.target(), "postgresql://reader@localhost:6543/people");
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn missing_username_is_rejected() {
        let err = ConnectorConfig::builder(DatabaseType::Postgres)
            .server("localhost")
            .database("people")
            .password("x")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConnectorError::ConfigError(ref m) if m.contains("username")));
    }
}
