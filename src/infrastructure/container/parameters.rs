//! 调用方覆盖参数与构造参数

use super::Instance;
use crate::errors::ContainerError;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// 按参数名覆盖的取值，只作用于当前这一次构建
#[derive(Clone, Default)]
pub struct Parameters {
    values: HashMap<String, Instance>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个覆盖值
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.values.insert(name.into(), Arc::new(value));
        self
    }

    /// 添加一个已经类型擦除的覆盖值（例如另一个容器实例）
    pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    /// 按类型读取覆盖值，工厂函数使用
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.values.get(name).and_then(|v| v.clone().downcast::<T>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl std::fmt::Debug for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Parameters").field("names", &names).finish()
    }
}

/// 已解析的构造参数，按声明顺序依次取出
pub struct Arguments {
    target: String,
    values: VecDeque<(String, Instance)>,
}

impl Arguments {
    pub(crate) fn new(target: impl Into<String>, values: Vec<(String, Instance)>) -> Self {
        Self {
            target: target.into(),
            values: values.into(),
        }
    }

    /// 正在构建的类型标识
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取出下一个参数并转换为 `Arc<T>`
    pub fn next<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>, ContainerError> {
        let (name, value) = self.values.pop_front().ok_or_else(|| ContainerError::FactoryFailed {
            target: self.target.clone(),
            reason: "constructor requested more arguments than were declared".to_string(),
        })?;

        value.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            target: format!("{}::{}", self.target, name),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// 取出下一个标量参数的副本
    pub fn next_value<T: Any + Send + Sync + Clone>(&mut self) -> Result<T, ContainerError> {
        self.next::<T>().map(|value| (*value).clone())
    }
}
