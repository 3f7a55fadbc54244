use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::usecase::services::collection_controller::{ControllerConfig, FilterMode};
use crate::usecase::services::pagination::PageSource;

const CONFIG_FILENAME: &str = "config.json";
pub const BASE_URL_ENV: &str = "TVET_API_BASE_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} must be greater than zero")]
    ZeroPageSize(&'static str),
}

/// Dashboard settings, stored as `config.json` in the platform config dir.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_client_page_size")]
    pub client_page_size: usize,

    /// `None` loads whole collections and paginates locally.
    #[serde(default = "default_server_page_size")]
    pub server_page_size: Option<usize>,

    #[serde(default)]
    pub filter_mode: FilterMode,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_client_page_size() -> usize {
    10
}

fn default_server_page_size() -> Option<usize> {
    Some(100)
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            client_page_size: default_client_page_size(),
            server_page_size: default_server_page_size(),
            filter_mode: FilterMode::default(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Reads `config.json` from `config_dir`, falling back to defaults when
    /// it does not exist.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILENAME);
        let config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_page_size == 0 {
            return Err(ConfigError::ZeroPageSize("clientPageSize"));
        }
        if self.server_page_size == Some(0) {
            return Err(ConfigError::ZeroPageSize("serverPageSize"));
        }
        Ok(())
    }

    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            source: match self.server_page_size {
                Some(server_page_size) => PageSource::Paged { server_page_size },
                None => PageSource::Unpaged,
            },
            client_page_size: self.client_page_size,
            filter_mode: self.filter_mode,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_test_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("tvet-{prefix}-{nanos}"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = unique_test_dir("config-missing");
        let config = AppConfig::load(&dir).expect("defaults should load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = unique_test_dir("config-partial");
        fs::create_dir_all(&dir).expect("should create temp dir");
        fs::write(
            dir.join(CONFIG_FILENAME),
            r#"{"clientPageSize": 25, "serverPageSize": null, "filterMode": "server"}"#,
        )
        .expect("should write config");

        let config = AppConfig::load(&dir).expect("config should load");

        assert_eq!(config.client_page_size, 25);
        assert_eq!(config.controller().source, PageSource::Unpaged);
        assert_eq!(config.filter_mode, FilterMode::Server);
        assert_eq!(config.api_base_url, default_base_url());

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let dir = unique_test_dir("config-zero");
        fs::create_dir_all(&dir).expect("should create temp dir");
        fs::write(dir.join(CONFIG_FILENAME), r#"{"clientPageSize": 0}"#)
            .expect("should write config");

        let err = AppConfig::load(&dir).expect_err("zero page size should fail");
        assert!(matches!(err, ConfigError::ZeroPageSize("clientPageSize")));

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }
}
