//! 基础设施层
//!
//! 提供依赖注入容器与服务提供者

// 容器实现
pub mod container;
pub mod provider;

// 重新导出API
pub use container::{Concrete, Container, ContainerStats, Dependency, Injectable, Instance, Parameters};
pub use provider::ServiceProvider;
