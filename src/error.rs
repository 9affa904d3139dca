use thiserror::Error;

/// Error category, for callers that only care which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings file or settings values are unusable.
    Config,
    /// No session could be established, or the session is gone.
    Connection,
    /// The driver rejected or failed the statement.
    Query,
}

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

impl ConnectorError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectorError::ConfigError(_) => ErrorKind::Config,
            ConnectorError::ConnectionError(_) => ErrorKind::Connection,
            ConnectorError::QueryError(_) => ErrorKind::Query,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ConnectorError::ConfigError(msg.into())
    }

    pub(crate) fn connection(msg: impl Into<String>) -> Self {
        ConnectorError::ConnectionError(msg.into())
    }

    pub(crate) fn query(msg: impl Into<String>) -> Self {
        ConnectorError::QueryError(msg.into())
    }
}

impl From<dotenvy::Error> for ConnectorError {
    fn from(err: dotenvy::Error) -> Self {
        match err {
            dotenvy::Error::LineParse(line, pos) => ConnectorError::ConfigError(format!(
                "malformed settings line at position {pos}: {line}"
            )),
            dotenvy::Error::Io(e) => {
                ConnectorError::ConfigError(format!("cannot read settings file: {e}"))
            }
            other => ConnectorError::ConfigError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(ConnectorError::config("x").kind(), ErrorKind::Config);
        assert_eq!(ConnectorError::connection("x").kind(), ErrorKind::Connection);
        assert_eq!(ConnectorError::query("x").kind(), ErrorKind::Query);
    }

    #[test]
    fn messages_carry_driver_text() {
        let err = ConnectorError::query("no such table: persons");
        assert_eq!(err.to_string(), "Query error: no such table: persons");
    }
}
