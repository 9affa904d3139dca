use std::collections::HashMap;
use std::path::Path;

use super::{ConnectorConfig, RECOGNIZED_KEYS};
use crate::error::ConnectorError;

const KEY_PREFIX: &str = "CONNECTOR_DB_";

/// Connector-prefixed keys the connector does not read, usually typos.
fn unrecognized_keys(values: &HashMap<String, String>) -> Vec<&str> {
    let mut keys: Vec<&str> = values
        .keys()
        .map(String::as_str)
        .filter(|key| key.starts_with(KEY_PREFIX) && !RECOGNIZED_KEYS.contains(key))
        .collect();
    keys.sort_unstable();
    keys
}

/// Read every `KEY=value` pair of an env-style file without touching the
/// process environment.
///
/// # Errors
/// Returns `ConnectorError::ConfigError` if the file is missing, unreadable, or has a malformed line.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConnectorError> {
    tracing::info!("loading settings file {}", path.display());
    if !path.is_file() {
        tracing::info!("loading settings file failed");
        return Err(ConnectorError::config(format!(
            "settings file does not exist: {}",
            path.display()
        )));
    }

    let mut values = HashMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        values.insert(key, value);
    }
    tracing::info!("loaded {} setting(s)", values.len());
    for key in unrecognized_keys(&values) {
        tracing::warn!("ignoring unrecognized setting {key}");
    }
    Ok(values)
}

impl ConnectorConfig {
    /// Load settings from an env-style file.
    ///
    /// Keys already set in the process environment take precedence over the
    /// file, the same way a dotenv loader leaves existing variables alone.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` if the file cannot be used or a required key is missing.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let file_values = read_env_file(path.as_ref())?;
        Self::from_settings(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_values.get(key).cloned())
        })
    }

    /// Load settings from an env-style file, ignoring the process environment.
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` if the file cannot be used or a required key is missing.
    pub fn from_env_file_only(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let file_values = read_env_file(path.as_ref())?;
        Self::from_settings(|key| file_values.get(key).cloned())
    }
}
