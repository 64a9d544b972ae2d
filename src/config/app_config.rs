use serde::Deserialize;
use std::{collections::HashMap, path::PathBuf};
use crate::errors::ConfigError;

use super::{
    container_config::{ContainerConfig, PartialContainerConfig},
    logging_config::{LoggingSettings, PartialLoggingSettings},
    loader::ConfigLoader,
};

// Configuration location constants
pub const USER_CONFIG_PATH: &str = "~/.config/servicebox";

// Configuration file names
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Prefix shared by all environment overrides
pub const ENV_PREFIX: &str = "SERVICEBOX_";

/// Main Application Configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub container: ContainerConfig,
    pub logging: LoggingSettings,
}

/// Partial Application Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialAppConfig {
    container: Option<PartialContainerConfig>,
    logging: Option<PartialLoggingSettings>,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load_config()
    }

    /// Load configuration with custom base path (for testing)
    pub fn load_with_base_path(base_path: PathBuf) -> Result<Self, ConfigError> {
        let loader = ConfigLoader::with_base_path(base_path);
        loader.load_config()
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let loader = ConfigLoader::with_config_file(path);
        loader.load_config()
    }

    /// Create AppConfig from partial config and environment
    pub fn from_partial_and_env(
        partial: Option<PartialAppConfig>,
        env_map: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();

        let container = ContainerConfig::from_env_or_file(partial.container, &env_map)?;
        let logging = LoggingSettings::from_env_or_file(partial.logging, &env_map)?;

        Ok(AppConfig { container, logging })
    }
}
