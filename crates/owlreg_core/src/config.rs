//! Backend connection settings.
//!
//! # Responsibility
//! - Describe where each backend lives and how long to wait for it.
//! - Carry workable local defaults so a bare process start still runs.
//!
//! # Invariants
//! - Config is plain data; opening connections is the adapters' job.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_FILE: &str = "student_records.db";
const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for the embedded SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmbeddedConfig {
    pub file_path: PathBuf,
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_DB_FILE),
        }
    }
}

/// Settings for the networked MySQL store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkedConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub connect_timeout_secs: u64,
}

impl NetworkedConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for NetworkedConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_MYSQL_PORT,
            user: "root".to_string(),
            password: String::new(),
            database: "owlreg".to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Full engine configuration: one section per backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub embedded: EmbeddedConfig,
    pub networked: NetworkedConfig,
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, NetworkedConfig};
    use std::path::Path;

    #[test]
    fn defaults_match_local_development_setup() {
        let config = EngineConfig::default();
        assert_eq!(config.embedded.file_path, Path::new("student_records.db"));
        assert_eq!(config.networked.host, "127.0.0.1");
        assert_eq!(config.networked.port, 3306);
        assert_eq!(config.networked.user, "root");
        assert!(config.networked.password.is_empty());
        assert_eq!(config.networked.connect_timeout_secs, 10);
    }

    #[test]
    fn partial_json_overrides_keep_remaining_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "embedded": { "file_path": "/var/lib/owlreg/records.db" },
                "networked": { "host": "db.internal", "password": "hunter2" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.embedded.file_path,
            Path::new("/var/lib/owlreg/records.db")
        );
        assert_eq!(config.networked.host, "db.internal");
        assert_eq!(config.networked.password, "hunter2");
        assert_eq!(config.networked.port, NetworkedConfig::default().port);
        assert_eq!(config.networked.database, "owlreg");
    }
}
