//! Configuration management for the ICP fit evaluator

use crate::error::{IcpError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub rules: RulesConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub model: String,
    pub api_base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    pub validation_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                model: "gemini-2.5-flash".to_string(),
                api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key_env: "GOOGLE_API_KEY".to_string(),
                request_timeout_secs: 120,
                validation_timeout_secs: 30,
            },
            rules: RulesConfig {
                path: PathBuf::from("icp_rules.json"),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Loads the config from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::read(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Loads the config from an explicit path. A missing file yields defaults
    /// and is left untouched.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::read(path)
        } else {
            log::warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            IcpError::Configuration(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            IcpError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("icp-fit-evaluator")
            .join("config.toml")
    }

    /// Reads the API key named by `service.api_key_env`, loading `.env` first.
    pub fn api_key(&self) -> Result<String> {
        dotenvy::dotenv().ok();

        match std::env::var(&self.service.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(IcpError::Credential(format!(
                "environment variable '{}' is not set",
                self.service.api_key_env
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.model, "gemini-2.5-flash");
        assert_eq!(config.service.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.rules.path, PathBuf::from("icp_rules.json"));
        assert_eq!(config.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.service.request_timeout_secs = 45;
        config.output.format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, Config::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_config_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "service = [not valid").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, IcpError::Configuration(_)));
    }

    #[test]
    fn test_api_key_missing_is_credential_error() {
        let mut config = Config::default();
        config.service.api_key_env = "ICP_FIT_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        let err = config.api_key().unwrap_err();
        assert!(matches!(err, IcpError::Credential(_)));
    }
}
