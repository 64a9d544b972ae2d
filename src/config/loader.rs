use std::{collections::HashMap, env, fs, path::{Path, PathBuf}};
use crate::errors::ConfigError;

use super::app_config::{AppConfig, PartialAppConfig, CONFIG_FILE_NAME, ENV_PREFIX, USER_CONFIG_PATH};

/// Configuration loader responsible for loading config from files and environment
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default paths
    pub fn new() -> Self {
        Self {
            base_path: None,
            config_file: None,
        }
    }

    /// Create a config loader with custom base path (for testing)
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
            config_file: None,
        }
    }

    /// Create a config loader reading an explicit file
    pub fn with_config_file(config_file: PathBuf) -> Self {
        Self {
            base_path: None,
            config_file: Some(config_file),
        }
    }

    /// Load complete application configuration
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let config_path = self.config_path();

        // Load partial config from file
        let partial_config = self.load_partial_config(&config_path)?;

        // Collect environment variables
        let env_map = self.collect_env_vars();

        AppConfig::from_partial_and_env(partial_config, env_map)
    }

    /// Path of the configuration file this loader reads
    pub fn config_path(&self) -> PathBuf {
        if let Some(config_file) = &self.config_file {
            return config_file.clone();
        }

        let base_dir = if let Some(base_path) = &self.base_path {
            // For testing: use custom base path
            base_path.join(USER_CONFIG_PATH.trim_start_matches("~/"))
        } else {
            // Normal operation: expand tilde
            let expanded = shellexpand::tilde(USER_CONFIG_PATH);
            PathBuf::from(expanded.as_ref())
        };

        base_dir.join(CONFIG_FILE_NAME)
    }

    /// Load partial configuration, a missing file means defaults
    fn load_partial_config(&self, config_path: &Path) -> Result<Option<PartialAppConfig>, ConfigError> {
        if !config_path.exists() {
            tracing::info!("配置文件 {} 不存在，使用默认配置", config_path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::FileRead(config_path.to_string_lossy().to_string(), e)
        })?;

        let partial = toml::from_str::<PartialAppConfig>(&content).map_err(|e| {
            ConfigError::TomlParse(config_path.to_string_lossy().to_string(), e)
        })?;

        tracing::info!("已加载配置文件 {}", config_path.display());
        Ok(Some(partial))
    }

    /// Collect environment variables relevant to configuration
    fn collect_env_vars(&self) -> HashMap<String, String> {
        env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
