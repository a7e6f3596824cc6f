use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LIST_SIZE: usize = 10;
const DEFAULT_SYNC_DEBOUNCE_MS: u64 = 1000;
const DEFAULT_PERSIST_BATCH_MS: u64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding persisted sessions and local backlog data.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_list_size: Option<usize>,
    #[serde(default)]
    pub sync_debounce_ms: Option<u64>,
    #[serde(default)]
    pub persist_batch_ms: Option<u64>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/goat/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("goat/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("goat\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Reads a config file, falling back to defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn effective_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("goat")))
            .unwrap_or_else(|| PathBuf::from(".goat"))
    }

    pub fn effective_list_size(&self) -> usize {
        self.default_list_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_LIST_SIZE)
    }

    pub fn sync_debounce(&self) -> Duration {
        Duration::from_millis(self.sync_debounce_ms.unwrap_or(DEFAULT_SYNC_DEBOUNCE_MS))
    }

    pub fn persist_batch_window(&self) -> Duration {
        Duration::from_millis(self.persist_batch_ms.unwrap_or(DEFAULT_PERSIST_BATCH_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.effective_list_size(), 10);
        assert_eq!(config.sync_debounce(), Duration::from_secs(1));
        assert_eq!(config.persist_batch_window(), Duration::from_millis(100));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/goat\"\ndefault_list_size = 25\nsync_debounce_ms = 250\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.effective_data_dir(), PathBuf::from("/tmp/goat"));
        assert_eq!(config.effective_list_size(), 25);
        assert_eq!(config.sync_debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_list_size = \"many\"").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.effective_list_size(), 10);
    }

    #[test]
    fn test_zero_list_size_is_ignored() {
        let config = AppConfig {
            default_list_size: Some(0),
            ..Default::default()
        };
        assert_eq!(config.effective_list_size(), 10);
    }
}
