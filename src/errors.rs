use thiserror::Error;

/// 依赖注入容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 目标无法实例化（抽象类型、未注册类型），携带当前构建链
    #[error("Target [{target}] is not instantiable{}", while_building(.build_stack))]
    NotInstantiable {
        target: String,
        build_stack: Vec<String>,
    },

    /// 参数既没有类型约束、覆盖值，也没有默认值
    #[error("Unresolvable dependency resolving [{parameter}] in [{target}].")]
    UnresolvedDependency { parameter: String, target: String },

    /// 循环依赖
    #[error("Circular dependency detected while resolving [{target}]: {}", .chain.join(" -> "))]
    CyclicDependency { target: String, chain: Vec<String> },

    /// 类型转换失败
    #[error("Type mismatch for [{target}]: expected '{expected}'")]
    TypeMismatch { target: String, expected: String },

    /// 工厂函数自身报告的失败
    #[error("Factory for [{target}] failed: {reason}")]
    FactoryFailed { target: String, reason: String },

    /// 服务提供者注册或启动失败
    #[error("Service provider '{provider}' failed: {reason}")]
    Provider { provider: String, reason: String },
}

fn while_building(build_stack: &[String]) -> String {
    if build_stack.is_empty() {
        ".".to_string()
    } else {
        format!(" while building [{}].", build_stack.join(", "))
    }
}

impl ContainerError {
    /// 出错的标识符
    pub fn target(&self) -> &str {
        match self {
            ContainerError::NotInstantiable { target, .. }
            | ContainerError::UnresolvedDependency { target, .. }
            | ContainerError::CyclicDependency { target, .. }
            | ContainerError::TypeMismatch { target, .. }
            | ContainerError::FactoryFailed { target, .. } => target,
            ContainerError::Provider { provider, .. } => provider,
        }
    }

    /// 是否允许被参数默认值替代
    ///
    /// 循环依赖属于注册错误，即使参数有默认值也照常上抛。
    pub fn allows_default_fallback(&self) -> bool {
        !matches!(self, ContainerError::CyclicDependency { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value '{value}' for configuration field '{field}'")]
    InvalidValue { field: String, value: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

/// Helper function to create config errors for invalid values
pub fn invalid_value(field: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.into(),
    }
}
