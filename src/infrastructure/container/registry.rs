//! 绑定注册表与共享实例缓存

use super::parameters::Parameters;
use super::{Container, Instance};
use crate::errors::ContainerError;
use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// 工厂函数：完全自行负责构建及其依赖
pub type Factory =
    Arc<dyn Fn(&Container, &Parameters) -> Result<Instance, ContainerError> + Send + Sync>;

/// 绑定目标
#[derive(Clone)]
pub enum Concrete {
    /// 类型标识：等于抽象标识时表示自身构建，否则是别名
    Type(String),
    /// 工厂函数
    Factory(Factory),
}

impl Concrete {
    /// 指向另一个标识
    pub fn to(id: impl Into<String>) -> Self {
        Concrete::Type(id.into())
    }

    /// 指向一个可注入类型
    pub fn of<T: super::Injectable>() -> Self {
        Concrete::Type(T::key())
    }

    /// 用返回具体类型的闭包创建工厂
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Container, &Parameters) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(move |container, params| {
            factory(container, params).map(|value| Arc::new(value) as Instance)
        }))
    }

    /// 用返回类型擦除实例的闭包创建工厂
    pub fn instance_factory<F>(factory: F) -> Self
    where
        F: Fn(&Container, &Parameters) -> Result<Instance, ContainerError> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(factory))
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Concrete::Factory(_))
    }

    /// 用于日志的简短描述
    pub fn describe(&self) -> &str {
        match self {
            Concrete::Type(id) => id,
            Concrete::Factory(_) => "<factory>",
        }
    }
}

impl std::fmt::Debug for Concrete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Concrete::Type(id) => f.debug_tuple("Type").field(id).finish(),
            Concrete::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// 服务注册信息
#[derive(Clone, Debug)]
pub struct Binding {
    pub concrete: Concrete,
    pub shared: bool,
}

/// 绑定与实例缓存
///
/// 绑定只在注册阶段通过 `&mut self` 修改；实例缓存在解析期间也会写入，
/// 因此放在 `DashMap` 中。
#[derive(Default)]
pub struct Registry {
    bindings: HashMap<String, Binding>,
    instances: DashMap<String, Instance>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录或替换绑定；已经缓存的共享实例不受影响
    pub fn bind(&mut self, abstract_id: String, concrete: Option<Concrete>, shared: bool) {
        let concrete = concrete.unwrap_or_else(|| Concrete::Type(abstract_id.clone()));
        self.bindings.insert(abstract_id, Binding { concrete, shared });
    }

    /// 直接写入实例缓存，覆盖已有值
    pub fn instance(&self, abstract_id: String, value: Instance) -> Instance {
        self.instances.insert(abstract_id, value.clone());
        value
    }

    pub fn cached(&self, abstract_id: &str) -> Option<Instance> {
        self.instances.get(abstract_id).map(|entry| entry.value().clone())
    }

    /// 写入共享实例；已有值时保留先写入者并返回它
    pub fn store_shared(&self, abstract_id: &str, value: Instance) -> Instance {
        self.instances
            .entry(abstract_id.to_string())
            .or_insert(value)
            .value()
            .clone()
    }

    pub fn has_instance(&self, abstract_id: &str) -> bool {
        self.instances.contains_key(abstract_id)
    }

    pub fn binding(&self, abstract_id: &str) -> Option<&Binding> {
        self.bindings.get(abstract_id)
    }

    pub fn has_binding(&self, abstract_id: &str) -> bool {
        self.bindings.contains_key(abstract_id)
    }

    /// 存在缓存实例，或绑定标记为共享
    pub fn is_shared(&self, abstract_id: &str) -> bool {
        self.has_instance(abstract_id)
            || self
                .bindings
                .get(abstract_id)
                .map(|binding| binding.shared)
                .unwrap_or(false)
    }

    /// 绑定目标；未绑定时把抽象标识本身当作具体类型
    pub fn get_concrete(&self, abstract_id: &str) -> Concrete {
        match self.bindings.get(abstract_id) {
            Some(binding) => binding.concrete.clone(),
            None => Concrete::Type(abstract_id.to_string()),
        }
    }

    pub fn binding_ids(&self) -> impl Iterator<Item = &String> {
        self.bindings.keys()
    }

    pub fn instance_ids(&self) -> Vec<String> {
        self.instances.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_without_concrete_binds_to_itself() {
        let mut registry = Registry::new();
        registry.bind("Logger".to_string(), None, false);

        match registry.get_concrete("Logger") {
            Concrete::Type(id) => assert_eq!(id, "Logger"),
            other => panic!("unexpected concrete {:?}", other),
        }
        assert!(!registry.is_shared("Logger"));
    }

    #[test]
    fn test_unbound_identifier_is_its_own_concrete() {
        let registry = Registry::new();
        assert!(matches!(registry.get_concrete("Clock"), Concrete::Type(id) if id == "Clock"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.bind("Logger".to_string(), Some(Concrete::to("FileLogger")), true);
        registry.bind("Logger".to_string(), Some(Concrete::to("NullLogger")), false);

        assert!(matches!(registry.get_concrete("Logger"), Concrete::Type(id) if id == "NullLogger"));
        assert!(!registry.is_shared("Logger"));
        assert_eq!(registry.binding_count(), 1);
    }

    #[test]
    fn test_instance_makes_identifier_shared() {
        let registry = Registry::new();
        let value: Instance = Arc::new(42u32);

        let returned = registry.instance("answer".to_string(), value.clone());

        assert!(Arc::ptr_eq(&returned, &value));
        assert!(registry.is_shared("answer"));
        assert!(Arc::ptr_eq(&registry.cached("answer").unwrap(), &value));
    }

    #[test]
    fn test_store_shared_keeps_first_writer() {
        let registry = Registry::new();
        let first: Instance = Arc::new(1u32);
        let second: Instance = Arc::new(2u32);

        let kept = registry.store_shared("counter", first.clone());
        assert!(Arc::ptr_eq(&kept, &first));

        let kept = registry.store_shared("counter", second);
        assert!(Arc::ptr_eq(&kept, &first));
    }

    #[test]
    fn test_explicit_instance_overwrites() {
        let registry = Registry::new();
        registry.instance("config".to_string(), Arc::new("old".to_string()));
        let replacement: Instance = Arc::new("new".to_string());
        registry.instance("config".to_string(), replacement.clone());

        assert!(Arc::ptr_eq(&registry.cached("config").unwrap(), &replacement));
        assert_eq!(registry.instance_count(), 1);
    }
}
