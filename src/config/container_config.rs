use serde::Deserialize;
use std::collections::HashMap;
use crate::errors::{invalid_value, ConfigError};

pub const ENV_DETECT_CYCLES: &str = "SERVICEBOX_DETECT_CYCLES";
pub const ENV_COLLECT_STATS: &str = "SERVICEBOX_COLLECT_STATS";

/// Configuration for container resolution behavior
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Report dependency cycles (including through aliases and factories) as errors
    /// instead of recursing until the stack overflows
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,

    /// Maintain resolution counters
    #[serde(default = "default_collect_stats")]
    pub collect_stats: bool,
}

/// Partial Container Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialContainerConfig {
    pub detect_cycles: Option<bool>,
    pub collect_stats: Option<bool>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: default_detect_cycles(),
            collect_stats: default_collect_stats(),
        }
    }
}

impl ContainerConfig {
    /// Create ContainerConfig from partial config with defaults
    pub fn from_partial(partial: Option<PartialContainerConfig>) -> Self {
        let partial = partial.unwrap_or_default();

        Self {
            detect_cycles: partial.detect_cycles.unwrap_or_else(default_detect_cycles),
            collect_stats: partial.collect_stats.unwrap_or_else(default_collect_stats),
        }
    }

    /// Environment variables take precedence over file values
    pub fn from_env_or_file(
        partial: Option<PartialContainerConfig>,
        env_map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::from_partial(partial);

        if let Some(value) = env_map.get(ENV_DETECT_CYCLES) {
            config.detect_cycles = parse_bool(ENV_DETECT_CYCLES, value)?;
        }
        if let Some(value) = env_map.get(ENV_COLLECT_STATS) {
            config.collect_stats = parse_bool(ENV_COLLECT_STATS, value)?;
        }

        Ok(config)
    }
}

pub(crate) fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_value(field, value)),
    }
}

// Default functions
fn default_detect_cycles() -> bool {
    true
}

fn default_collect_stats() -> bool {
    true
}
