//! Configuration file handling for finman.
//!
//! The configuration file is stored at `$FINMAN_HOME/config.json`. It holds the exchange rate API
//! key, the polling interval and the currencies shown in the rates table. The ledger itself lives
//! next to it in the same directory.

use crate::error::Res;
use crate::ledger::LedgerStore;
use crate::rates::DEFAULT_CURRENCIES;
use crate::store::FileStore;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "finman";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const POLL_INTERVAL_SECS: u64 = 60;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINMAN_HOME` and from there it loads `$FINMAN_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, if needed, and writes an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/finman`
    /// - `api_key` - The exchangerate-api.com key, if you have one yet.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists there, or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_key: Option<&str>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finman home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile {
            api_key: api_key.map(str::to_string),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `finman_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(finman_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = finman_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("finman home is missing, run 'finman init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'finman init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn api_key(&self) -> Option<&str> {
        self.config_file.api_key.as_deref()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config_file.poll_interval_secs.max(1))
    }

    /// The currencies shown in the rates table.
    pub fn currencies(&self) -> &[String] {
        &self.config_file.currencies
    }

    /// The blob store backed by the data directory.
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.root)
    }

    /// The ledger store backed by the data directory.
    pub fn ledger(&self) -> LedgerStore {
        LedgerStore::new(Box::new(self.store()))
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finman",
///   "config_version": 1,
///   "api_key": "aac7820d3c559807bc7d773a",
///   "poll_interval_secs": 60,
///   "currencies": ["USD", "EUR", "UZS", "RUB"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finman"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The exchangerate-api.com key. Can be overridden by `FINMAN_API_KEY` or `--api-key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,

    /// Seconds between rate fetches while watching rates
    #[serde(default = "default_poll_interval_secs")]
    poll_interval_secs: u64,

    /// The currencies listed by `finman rates`
    #[serde(default = "default_currencies")]
    currencies: Vec<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_key: None,
            poll_interval_secs: POLL_INTERVAL_SECS,
            currencies: default_currencies(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    POLL_INTERVAL_SECS
}

fn default_currencies() -> Vec<String> {
    DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect()
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is not a finman config
    pub async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("finman_home");

        let created = Config::create(&home_dir, Some("abc123")).await.unwrap();
        assert!(created.config_path().is_file());
        assert_eq!(created.api_key(), Some("abc123"));

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.api_key(), Some("abc123"));
        assert_eq!(loaded.poll_interval(), Duration::from_secs(60));
        assert_eq!(loaded.currencies(), ["USD", "EUR", "UZS", "RUB"]);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), None).await.unwrap();
        let err = Config::create(dir.path(), None).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("finman init"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, "finman");
        assert_eq!(config.poll_interval_secs, 60);
        assert!(config.api_key.is_none());
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "finman", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.currencies, default_currencies());
        assert!(config.api_key.is_none());
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "tiller", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_missing_key() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("api_key"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("config.json");
        let original = ConfigFile {
            api_key: Some("k".to_string()),
            poll_interval_secs: 5,
            currencies: vec!["USD".to_string(), "GBP".to_string()],
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);
    }
}
