//! Configuration file loading for the bot.
//!
//! Settings come from a TOML file (`tourney.toml` by default). Every key is
//! optional; a missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use tourney_store::{JsonStore, PersistenceStore, SqliteStore, StoreError};

use crate::auto_role::AutoRoleJob;
use crate::member::StaticDirectory;

/// Storage directory used when `[storage] path` is not set.
pub const DEFAULT_STORAGE_DIR: &str = "data";

/// Database file name used when a sqlite backend has no `path`.
pub const SQLITE_FILE: &str = "tourney.db";

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// `log_level` is not a tracing level name.
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Which persistence backend to use.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `teams.json` and `tournaments.json` in the storage directory.
    #[default]
    Json,
    /// A single SQLite database file.
    Sqlite,
}

/// Where and how the registry is persisted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// A directory for json, a database file for sqlite.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
        }
    }
}

impl StorageConfig {
    /// Returns the configured path, or the backend's default:
    /// `data` for json and `data/tourney.db` for sqlite.
    pub fn location(&self) -> PathBuf {
        match (&self.path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, StorageBackend::Json) => PathBuf::from(DEFAULT_STORAGE_DIR),
            (None, StorageBackend::Sqlite) => Path::new(DEFAULT_STORAGE_DIR).join(SQLITE_FILE),
        }
    }

    /// Opens the configured store. For sqlite the database file's parent
    /// directory is created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open(&self) -> Result<Box<dyn PersistenceStore>, StoreError> {
        let location = self.location();
        match self.backend {
            StorageBackend::Json => Ok(Box::new(JsonStore::new(location))),
            StorageBackend::Sqlite => {
                if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Ok(Box::new(SqliteStore::open(&location)?))
            }
        }
    }
}

/// Main bot configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Prefix every command must start with. Defaults to `!`.
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    /// Maximum tracing level. Defaults to `info`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Member id to display name.
    #[serde(default)]
    pub members: HashMap<String, String>,
    /// Auto-role job to start with the bot.
    #[serde(default)]
    pub auto_role: Option<AutoRoleJob>,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_prefix(),
            log_level: default_log_level(),
            storage: StorageConfig::default(),
            members: HashMap::new(),
            auto_role: None,
        }
    }
}

impl BotConfig {
    /// Loads the configuration from `path`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path of the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("tourney.toml")
    }

    /// Parses `log_level` into a tracing level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLogLevel`] for an unknown level name.
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Looks up a member's configured display name.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.members.get(id).map(String::as_str)
    }

    /// Builds the member directory from the `[members]` table.
    pub fn directory(&self) -> StaticDirectory {
        StaticDirectory::new(self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
command_prefix = "?"
log_level = "debug"

[storage]
backend = "sqlite"
path = "/var/lib/tourney/registry.db"

[members]
"123" = "Alice"
"456" = "Bob"

[auto_role]
interval_seconds = 300
criterion = "has_team"
target_role = "Competitor"
"#;

        let config: BotConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.command_prefix, "?");
        assert_eq!(config.level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(
            config.storage.location(),
            PathBuf::from("/var/lib/tourney/registry.db")
        );
        assert_eq!(config.display_name("123"), Some("Alice"));
        assert_eq!(config.display_name("789"), None);

        let job = config.auto_role.unwrap();
        assert_eq!(job.interval_seconds, 300);
        assert_eq!(job.criterion, "has_team");
        assert_eq!(job.target_role, "Competitor");
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();

        assert_eq!(config, BotConfig::default());
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.level().unwrap(), tracing::Level::INFO);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.storage.location(), PathBuf::from("data"));
        assert!(config.members.is_empty());
        assert!(config.auto_role.is_none());
    }

    #[test]
    fn test_partial_storage_section() {
        let config: BotConfig = toml::from_str("[storage]\nbackend = \"sqlite\"\n").unwrap();
        assert_eq!(config.storage.location(), PathBuf::from("data").join(SQLITE_FILE));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let result: Result<BotConfig, _> = toml::from_str("[storage]\nbackend = \"mongo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = BotConfig {
            log_level: "loud".to_string(),
            ..BotConfig::default()
        };
        assert!(matches!(
            config.level(),
            Err(ConfigError::InvalidLogLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = BotConfig::load(&dir.path().join("tourney.toml")).unwrap();
        assert_eq!(config, BotConfig::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tourney.toml");
        std::fs::write(&path, "command_prefix = [").unwrap();
        assert!(matches!(
            BotConfig::load(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_open_sqlite_uses_path_as_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("arena.db");
        let storage = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: Some(db.clone()),
        };
        let store = storage.open().unwrap();
        assert!(store.load().unwrap().is_empty());
        assert!(db.is_file());
        assert!(!dir.path().join("nested").join(SQLITE_FILE).exists());
    }

    #[test]
    fn test_open_json_uses_path_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            backend: StorageBackend::Json,
            path: Some(dir.path().join("state")),
        };
        let store = storage.open().unwrap();
        store.save(&tourney_core::RegistryState::new()).unwrap();
        assert!(dir.path().join("state").join("teams.json").is_file());
    }

    #[test]
    fn test_example_config_parses() {
        let config: BotConfig =
            toml::from_str(include_str!("../../../tourney.example.toml")).unwrap();
        assert_eq!(config.display_name("123456789"), Some("Alice"));
        assert!(config.auto_role.is_none());
    }

    #[test]
    fn test_config_path_returns_expected_path() {
        assert_eq!(BotConfig::config_path(), PathBuf::from("tourney.toml"));
    }
}
