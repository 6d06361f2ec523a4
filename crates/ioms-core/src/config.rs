//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the last email used to sign in and the
//! backend the session is stored in.
//!
//! Configuration is stored at `~/.config/ioms/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::DEFAULT_API_URL;
use crate::auth::{FileStorage, KeyringStorage, Storage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "ioms";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "IOMS_API_URL";

/// Where the session token is kept between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `session.json` in the cache directory
    #[default]
    File,
    /// The OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// API base URL: environment first, then config, then the default
    pub fn api_url(&self) -> String {
        self.resolve_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Backend the session is actually stored in.
    ///
    /// Without the platform credential stores (`native-keyring`) keyring
    /// entries do not outlive the process, so the file backend is used instead.
    pub fn effective_storage(&self) -> StorageBackend {
        match self.storage {
            StorageBackend::Keyring if !cfg!(feature = "native-keyring") => StorageBackend::File,
            backend => backend,
        }
    }

    /// Open the configured session storage
    pub fn open_storage(&self) -> Result<Arc<dyn Storage>> {
        Ok(self.open_storage_in(&self.cache_dir()?))
    }

    fn open_storage_in(&self, cache_dir: &Path) -> Arc<dyn Storage> {
        let backend = self.effective_storage();
        if backend != self.storage {
            warn!(
                "Keyring storage requires the native-keyring feature, keeping the session in {}",
                cache_dir.display()
            );
        }
        match backend {
            StorageBackend::File => Arc::new(FileStorage::in_dir(cache_dir)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SessionStore, User};

    #[test]
    fn test_api_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.resolve_api_url(None), DEFAULT_API_URL);

        config.api_url = Some("https://ioms.example.com".to_string());
        assert_eq!(config.resolve_api_url(None), "https://ioms.example.com");
        assert_eq!(
            config.resolve_api_url(Some("http://10.0.0.2:8000".to_string())),
            "http://10.0.0.2:8000"
        );
        assert_eq!(
            config.resolve_api_url(Some("  ".to_string())),
            "https://ioms.example.com"
        );
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config: Config = serde_json::from_str(r#"{"api_url": null, "last_email": null}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::File);

        let config: Config =
            serde_json::from_str(r#"{"api_url": null, "last_email": "a@b.com", "storage": "keyring"}"#)
                .unwrap();
        assert_eq!(config.storage, StorageBackend::Keyring);
        assert_eq!(config.last_email.as_deref(), Some("a@b.com"));
    }

    #[cfg(not(feature = "native-keyring"))]
    #[tokio::test]
    async fn test_keyring_without_native_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage: StorageBackend::Keyring,
            ..Config::default()
        };
        assert_eq!(config.effective_storage(), StorageBackend::File);

        let first = SessionStore::new(config.open_storage_in(dir.path()));
        first.rehydrate();
        first.login(User::new("a@b.com"), "tok123").unwrap();

        let restarted = SessionStore::new(config.open_storage_in(dir.path()));
        assert!(restarted.rehydrate());
        assert_eq!(restarted.token().as_deref(), Some("tok123"));
    }

    #[cfg(feature = "native-keyring")]
    #[test]
    fn test_keyring_kept_with_native_store() {
        let config = Config {
            storage: StorageBackend::Keyring,
            ..Config::default()
        };
        assert_eq!(config.effective_storage(), StorageBackend::Keyring);
    }

    #[test]
    fn test_file_backend_is_unchanged() {
        assert_eq!(Config::default().effective_storage(), StorageBackend::File);
    }
}
