pub mod app;
pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::{AppConfig, ContainerConfig};
pub use errors::{AppError, ContainerError};
pub use infrastructure::{
    Concrete, Container, ContainerStats, Dependency, Injectable, Instance, Parameters,
    ServiceProvider,
};
