use crate::error::ConnectorError;
use crate::types::DatabaseType;

/// Host, port and optional SQL Server instance split out of a server setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: Option<u16>,
    pub instance_name: Option<String>,
}

impl ServerAddress {
    /// Parse `host`, `host:port`, `[v6addr]:port`, and for SQL Server also
    /// `host,port` and `host\instance`.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` for an empty host or a bad port.
    pub fn parse(raw: &str, db_type: DatabaseType) -> Result<Self, ConnectorError> {
        let raw = raw.trim();
        let mut instance_name = None;
        let mut rest = raw;

        if db_type == DatabaseType::Mssql {
            if let Some((host, instance)) = rest.split_once('\\') {
                if instance.is_empty() {
                    return Err(ConnectorError::config(format!(
                        "empty instance name in server '{raw}'"
                    )));
                }
                instance_name = Some(instance.to_string());
                rest = host;
            }
            if let Some((host, port)) = rest.split_once(',') {
                return Self::finish(raw, host, Some(port), instance_name);
            }
        }

        if let Some(stripped) = rest.strip_prefix('[') {
            let (host, after) = stripped.split_once(']').ok_or_else(|| {
                ConnectorError::config(format!("unterminated '[' in server '{raw}'"))
            })?;
            let port = match after {
                "" => None,
                p => Some(p.strip_prefix(':').ok_or_else(|| {
                    ConnectorError::config(format!("unexpected text after ']' in server '{raw}'"))
                })?),
            };
            return Self::finish(raw, host, port, instance_name);
        }

        // more than one ':' is a bare IPv6 address
        match rest.matches(':').count() {
            1 => {
                let (host, port) = rest.split_once(':').unwrap_or((rest, ""));
                Self::finish(raw, host, Some(port), instance_name)
            }
            _ => Self::finish(raw, rest, None, instance_name),
        }
    }

    fn finish(
        raw: &str,
        host: &str,
        port: Option<&str>,
        instance_name: Option<String>,
    ) -> Result<Self, ConnectorError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ConnectorError::config(format!("no host in server '{raw}'")));
        }
        let port = port.map(|p| parse_port(p.trim())).transpose()?;
        Ok(Self {
            host: host.to_string(),
            port,
            instance_name,
        })
    }
}

pub(crate) fn parse_port(raw: &str) -> Result<u16, ConnectorError> {
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(ConnectorError::config(format!("invalid port '{raw}'"))),
        Ok(port) => Ok(port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str, db_type: DatabaseType) -> ServerAddress {
        ServerAddress::parse(raw, db_type).unwrap()
    }

    #[test]
    fn plain_host() {
        let addr = parse("db.internal", DatabaseType::Postgres);
        assert_eq!(addr.host, "db.internal");
        assert_eq!(addr.port, None);
    }

    #[test]
    fn host_with_colon_port() {
        let addr = parse("localhost:5433", DatabaseType::Postgres);
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.port, Some(5433));
    }

    #[test]
    fn bracketed_ipv6() {
        let addr = parse("[::1]:1433", DatabaseType::Mssql);
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.port, Some(1433));
        assert_eq!(parse("::1", DatabaseType::Postgres).host, "::1");
    }

    #[test]
    fn mssql_comma_port_and_instance() {
        let addr = parse("sql01,1450", DatabaseType::Mssql);
        assert_eq!(addr.port, Some(1450));

        let addr = parse(r"sql01\REPORTING", DatabaseType::Mssql);
        assert_eq!(addr.host, "sql01");
        assert_eq!(addr.instance_name.as_deref(), Some("REPORTING"));
    }

    #[test]
    fn bad_ports_are_config_errors() {
        for raw in ["h:", "h:abc", "h:0", "h:70000"] {
            let err = ServerAddress::parse(raw, DatabaseType::Postgres).unwrap_err();
            assert!(matches!(err, ConnectorError::ConfigError(_)), "{raw}");
        }
        assert!(ServerAddress::parse(":5432", DatabaseType::Postgres).is_err());
    }
}
