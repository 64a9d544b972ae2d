use serde::Deserialize;
use std::collections::HashMap;
use crate::errors::{invalid_value, ConfigError};
use crate::logging::{LogFormat, LoggingConfig};

pub const ENV_LOG_LEVEL: &str = "SERVICEBOX_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "SERVICEBOX_LOG_FORMAT";

/// Logging settings as written in the configuration file
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,

    /// pretty, json or compact
    #[serde(default = "default_format")]
    pub format: String,
}

/// Partial Logging Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingSettings {
    pub fn from_partial(partial: Option<PartialLoggingSettings>) -> Self {
        let partial = partial.unwrap_or_default();

        Self {
            level: partial.level.unwrap_or_else(default_level),
            format: partial.format.unwrap_or_else(default_format),
        }
    }

    pub fn from_env_or_file(
        partial: Option<PartialLoggingSettings>,
        env_map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Self::from_partial(partial);

        if let Some(level) = env_map.get(ENV_LOG_LEVEL) {
            settings.level = level.clone();
        }
        if let Some(format) = env_map.get(ENV_LOG_FORMAT) {
            settings.format = format.clone();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Validate level and format names
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level()?;
        self.format()?;
        Ok(())
    }

    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| invalid_value("logging.level", self.level.clone()))
    }

    pub fn format(&self) -> Result<LogFormat, ConfigError> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(invalid_value("logging.format", self.format.clone())),
        }
    }

    /// Convert into the runtime logging configuration
    pub fn to_logging_config(&self) -> Result<LoggingConfig, ConfigError> {
        Ok(LoggingConfig {
            level: self.level()?,
            format: self.format()?,
            ..LoggingConfig::default()
        })
    }
}

// Default functions
fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_settings() {
        let settings = LoggingSettings::default();
        assert_eq!(settings.level, "info");
        assert_eq!(settings.format, "pretty");
        assert_eq!(settings.level().unwrap(), tracing::Level::INFO);
        assert_eq!(settings.format().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides() {
        let mut env_map = HashMap::new();
        env_map.insert(ENV_LOG_LEVEL.to_string(), "debug".to_string());
        env_map.insert(ENV_LOG_FORMAT.to_string(), "json".to_string());

        let settings = LoggingSettings::from_env_or_file(None, &env_map).unwrap();
        let config = settings.to_logging_config().unwrap();
        assert_eq!(config.level, tracing::Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let partial = PartialLoggingSettings {
            level: None,
            format: Some("xml".to_string()),
        };

        let result = LoggingSettings::from_env_or_file(Some(partial), &HashMap::new());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
