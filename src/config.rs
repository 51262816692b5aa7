//! Configuration module for filekeep.

use serde::Deserialize;
use std::path::Path;

use crate::{FilekeepError, Result};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_max_upload_size() -> u64 {
    10
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

impl WebConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/filekeep.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the storage root directory.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Remove directories left empty after a move or delete.
    #[serde(default)]
    pub prune_empty_dirs: bool,
}

fn default_storage_path() -> String {
    "data/files".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            prune_empty_dirs: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filekeep.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| FilekeepError::from_io(e, path))?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FilekeepError::Config(format!("parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEKEEP_STORAGE_PATH`: storage root directory
    /// - `FILEKEEP_DATABASE_PATH`: SQLite database file
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FILEKEEP_STORAGE_PATH") {
            if !path.is_empty() {
                self.storage.path = path;
            }
        }
        if let Ok(path) = std::env::var("FILEKEEP_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.path.trim().is_empty() {
            return Err(FilekeepError::Config(
                "storage.path must not be empty. \
                 Set it in config.toml or via FILEKEEP_STORAGE_PATH."
                    .to_string(),
            ));
        }
        if self.database.path.trim().is_empty() {
            return Err(FilekeepError::Config(
                "database.path must not be empty. \
                 Set it in config.toml or via FILEKEEP_DATABASE_PATH."
                    .to_string(),
            ));
        }
        if self.web.max_upload_size_mb == 0 {
            return Err(FilekeepError::Config(
                "web.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_origins.is_empty());
        assert_eq!(config.web.max_upload_size_mb, 10);
        assert_eq!(config.web.max_upload_size_bytes(), 10 * 1024 * 1024);

        assert_eq!(config.database.path, "data/filekeep.db");
        assert_eq!(config.database.max_connections, 5);

        assert_eq!(config.storage.path, "data/files");
        assert!(!config.storage.prune_empty_dirs);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/filekeep.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[web]
host = "0.0.0.0"
port = 9000
cors_origins = ["http://localhost:5173"]
max_upload_size_mb = 50

[database]
path = "/var/lib/filekeep/meta.db"
max_connections = 2

[storage]
path = "/srv/files"
prune_empty_dirs = true

[logging]
level = "debug"
file = ""
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.web.max_upload_size_mb, 50);
        assert_eq!(config.database.path, "/var/lib/filekeep/meta.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.storage.path, "/srv/files");
        assert!(config.storage.prune_empty_dirs);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[storage]
path = "/mnt/share"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.storage.path, "/mnt/share");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.database.path, "data/filekeep.db");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.storage.path, "data/files");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[web]\nport = \"not a number\"");

        if let Err(FilekeepError::Config(msg)) = result {
            assert!(msg.contains("parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FilekeepError::Io(_))));
    }

    #[test]
    fn test_load_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[web]\nport = 8181\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.web.port, 8181);
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_storage = std::env::var("FILEKEEP_STORAGE_PATH").ok();
        let original_db = std::env::var("FILEKEEP_DATABASE_PATH").ok();

        std::env::set_var("FILEKEEP_STORAGE_PATH", "/env/files");
        std::env::set_var("FILEKEEP_DATABASE_PATH", "");

        let mut config = Config::default();
        config.database.path = "original.db".to_string();
        config.apply_env_overrides();

        assert_eq!(config.storage.path, "/env/files");
        // Empty values do not override.
        assert_eq!(config.database.path, "original.db");

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\npath = \"/from/file\"\n[database]\npath = \"file.db\"\n")
            .unwrap();
        let loaded = Config::load_with_env(&path).unwrap();
        assert_eq!(loaded.storage.path, "/env/files");
        assert_eq!(loaded.database.path, "file.db");

        match original_storage {
            Some(val) => std::env::set_var("FILEKEEP_STORAGE_PATH", val),
            None => std::env::remove_var("FILEKEEP_STORAGE_PATH"),
        }
        match original_db {
            Some(val) => std::env::set_var("FILEKEEP_DATABASE_PATH", val),
            None => std::env::remove_var("FILEKEEP_DATABASE_PATH"),
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_storage_path() {
        let mut config = Config::default();
        config.storage.path = "  ".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(FilekeepError::Config(ref msg)) if msg.contains("storage.path")));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();

        let result = config.validate();
        assert!(matches!(result, Err(FilekeepError::Config(ref msg)) if msg.contains("database.path")));
    }

    #[test]
    fn test_validate_zero_upload_size() {
        let mut config = Config::default();
        config.web.max_upload_size_mb = 0;

        assert!(config.validate().is_err());
    }
}
