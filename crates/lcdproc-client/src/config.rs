//! TOML-based client configuration.
//!
//! Example file:
//!
//! ```toml
//! host = "192.168.1.20"
//! port = 13666
//! name = "jukebox"
//! ```
//!
//! All fields are optional; absent fields fall back to serde defaults so a
//! partial (or missing) file still yields a usable configuration.  Where the
//! file lives is the caller's choice; the library takes an explicit path.

use std::path::Path;

use lcdproc_core::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Connection settings for one LCDd server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Hostname or IP address of the LCDd server.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port of the control channel.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Client name registered via `client_set` and used as the prefix of
    /// every generated screen id.
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_name() -> String {
    "lcdproc-client".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_name(),
        }
    }
}

impl ClientConfig {
    /// The `host:port` address string for the TCP connect.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loads the configuration from a TOML file, falling back to defaults
    /// for absent fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Writes the configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_localhost_13666() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.addr(), "127.0.0.1:13666");
        assert_eq!(cfg.name, "lcdproc-client");
    }

    #[test]
    fn test_partial_toml_uses_defaults_for_absent_fields() {
        let cfg: ClientConfig = toml::from_str("name = \"jukebox\"").unwrap();
        assert_eq!(cfg.name, "jukebox");
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 13666);
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = ClientConfig {
            host: "10.0.0.5".to_string(),
            port: 13667,
            name: "statusd".to_string(),
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_empty_toml_is_fully_defaulted() {
        let cfg: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }
}
