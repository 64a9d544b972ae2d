pub mod app_config;
pub mod container_config;
pub mod loader;
pub mod logging_config;

// Re-export commonly used types
pub use app_config::AppConfig;
pub use container_config::ContainerConfig;
pub use loader::ConfigLoader;
pub use logging_config::LoggingSettings;

// Re-export constants
pub use app_config::{CONFIG_FILE_NAME, ENV_PREFIX, USER_CONFIG_PATH};
