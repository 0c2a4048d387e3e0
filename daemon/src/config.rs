//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("owner address is required (set `owner` in the config or pass --owner)")]
    MissingOwner,
}

/// Configuration for a GaslessPoll daemon.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). CLI flags and environment
/// variables override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Address the RPC server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Owner address for privileged operations (force drain, batch settings).
    #[serde(default)]
    pub owner: Option<String>,

    /// Deployment label; hashed into the signature domain tag, so two
    /// deployments with different labels accept disjoint signatures.
    #[serde(default = "default_instance_label")]
    pub instance_label: String,

    /// File the service snapshot is loaded from on startup and saved to on
    /// shutdown.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Queue length at which submission triggers settlement.
    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: usize,

    /// Hard cap on entries drained per settlement call.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Minimum accepted poll duration in seconds.
    #[serde(default = "default_min_duration_secs")]
    pub min_duration_secs: u64,

    /// Maximum accepted poll duration in seconds.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1:7090".to_string()
}

fn default_instance_label() -> String {
    "gasless-poll".to_string()
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./gpoll_state.bin")
}

fn default_min_batch_size() -> usize {
    5
}

fn default_max_batch_size() -> usize {
    20
}

fn default_min_duration_secs() -> u64 {
    60
}

fn default_max_duration_secs() -> u64 {
    60 * 60 * 24 * 30
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config must deserialize via defaults")
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:7090");
        assert_eq!(config.min_batch_size, 5);
        assert_eq!(config.max_batch_size, 20);
        assert_eq!(config.owner, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "owner = \"gp_someowner\"\nmin_batch_size = 2\nlog_format = \"json\""
        )
        .unwrap();
        let config = DaemonConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.owner.as_deref(), Some("gp_someowner"));
        assert_eq!(config.min_batch_size, 2);
        assert_eq!(config.log_format, "json");
        // Untouched fields keep their defaults.
        assert_eq!(config.max_batch_size, 20);
        assert_eq!(config.instance_label, "gasless-poll");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = DaemonConfig::from_toml_file(Path::new("/does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_batch_size = \"not a number\"").unwrap();
        let err = DaemonConfig::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
