//! Node configuration.
//!
//! All fields have working defaults; a config file only needs to name what
//! it changes. Times are in milliseconds.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use flypost_sync::{ClientConfig, ServerConfig};

use crate::error::ConfigError;

/// Node-level configuration, loadable from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Address the sync listener binds to.
    pub listen_addr: String,

    /// Port the sync listener binds to.
    pub listen_port: u16,

    /// Accept poll window; shutdown takes effect within one of these.
    pub poll_interval_ms: u64,

    /// Bound on establishing an outgoing connection.
    pub connect_timeout_ms: u64,

    /// Bound on a single request or response, either direction.
    pub io_timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_owned(),
            listen_port: 1337,
            poll_interval_ms: 500,
            connect_timeout_ms: 5_000,
            io_timeout_ms: 10_000,
        }
    }
}

impl NodeConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// The `host:port` string the listener binds to.
    pub fn listen_on(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    pub(crate) fn server_config(&self) -> ServerConfig {
        ServerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            session_timeout: Duration::from_millis(self.io_timeout_ms),
        }
    }

    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            io_timeout: Duration::from_millis(self.io_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0");
        assert_eq!(config.listen_port, 1337);
        assert_eq!(config.listen_on(), "0.0.0.0:1337");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: NodeConfig = toml::from_str("listen_port = 4242").unwrap();
        assert_eq!(config.listen_port, 4242);
        assert_eq!(config.listen_addr, "0.0.0.0");
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<NodeConfig>("listen_prot = 4242").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_addr = \"127.0.0.1\"").unwrap();
        writeln!(file, "listen_port = 9000").unwrap();

        let config = NodeConfig::load(file.path()).unwrap();
        assert_eq!(config.listen_on(), "127.0.0.1:9000");
    }

    #[test]
    fn test_load_missing_file() {
        let err = NodeConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
