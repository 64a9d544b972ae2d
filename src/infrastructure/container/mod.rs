//! 依赖注入容器
//!
//! 提供按字符串标识注册和解析服务的功能，支持：
//! - 自身构建、别名、工厂三种绑定方式
//! - 共享（单例）与瞬态生命周期
//! - 预构建实例注册
//! - 构建后扩展钩子
//! - 构建链诊断与循环依赖检测
//!
//! 注册阶段需要 `&mut Container`，之后可以放进 `Arc` 在线程间共享解析。

pub mod build_stack;
pub mod extenders;
pub mod introspector;
pub mod parameters;
pub mod registry;
mod resolver;
pub mod stats;

pub use build_stack::{BuildGuard, BuildStack};
pub use extenders::{Extender, ExtenderSet};
pub use introspector::{
    Constructor, ConstructorInfo, Dependency, Injectable, TypeDescriptor, TypeRegistry, TypeShape,
};
pub use parameters::{Arguments, Parameters};
pub use registry::{Binding, Concrete, Factory, Registry};
pub use stats::ContainerStats;

use crate::config::ContainerConfig;
use crate::errors::ContainerError;
use crate::infrastructure::provider::ServiceProvider;
use stats::InnerStats;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 容器中保存的类型擦除实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 依赖注入容器
pub struct Container {
    registry: Registry,
    types: TypeRegistry,
    extenders: ExtenderSet,
    build_stack: BuildStack,
    /// 正在解析的抽象标识（每线程），覆盖别名和工厂内的嵌套 `make`
    resolving: BuildStack,
    providers: Vec<Arc<dyn ServiceProvider>>,
    booted: AtomicBool,
    stats: InnerStats,
    config: ContainerConfig,
}

impl Container {
    /// 创建新的容器实例
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            registry: Registry::new(),
            types: TypeRegistry::new(),
            extenders: ExtenderSet::new(),
            build_stack: BuildStack::new(),
            resolving: BuildStack::new(),
            providers: Vec::new(),
            booted: AtomicBool::new(false),
            stats: InnerStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    // ===== 类型描述 =====

    /// 注册可注入类型的构造描述
    pub fn register_type<T: Injectable>(&mut self) -> &mut Self {
        self.register_descriptor(TypeDescriptor::of::<T>())
    }

    /// 标记接口/抽象角色，直接构建时报告不可实例化
    pub fn register_abstract(&mut self, id: impl Into<String>) -> &mut Self {
        self.register_descriptor(TypeDescriptor::abstract_type(id))
    }

    pub fn register_descriptor(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        tracing::debug!(
            type_id = %descriptor.id,
            instantiable = descriptor.is_instantiable(),
            "Type descriptor registered"
        );
        self.types.insert(descriptor);
        self
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    // ===== 绑定 =====

    /// 记录或替换绑定，`concrete` 为 `None` 时绑定到自身
    pub fn bind(
        &mut self,
        abstract_id: impl Into<String>,
        concrete: Option<Concrete>,
        shared: bool,
    ) -> &mut Self {
        let abstract_id = abstract_id.into();
        tracing::debug!(
            abstract_id = %abstract_id,
            concrete = concrete.as_ref().map(Concrete::describe).unwrap_or("<self>"),
            shared,
            "Binding registered"
        );
        self.registry.bind(abstract_id, concrete, shared);
        self
    }

    /// 注册共享绑定
    pub fn singleton(&mut self, abstract_id: impl Into<String>, concrete: Option<Concrete>) -> &mut Self {
        self.bind(abstract_id, concrete, true)
    }

    /// 注册预构建实例，之后的解析都返回这个值
    pub fn instance(&self, abstract_id: impl Into<String>, value: Instance) -> Instance {
        let abstract_id = abstract_id.into();
        tracing::debug!(abstract_id = %abstract_id, "Instance registered");
        self.registry.instance(abstract_id, value)
    }

    /// 类型化的 [`Container::instance`]
    pub fn instance_of<T: Any + Send + Sync>(&self, abstract_id: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.instance(abstract_id, value.clone());
        value
    }

    pub fn is_shared(&self, abstract_id: &str) -> bool {
        self.registry.is_shared(abstract_id)
    }

    pub fn get_concrete(&self, abstract_id: &str) -> Concrete {
        self.registry.get_concrete(abstract_id)
    }

    /// 是否有绑定、缓存实例或类型描述
    pub fn bound(&self, abstract_id: &str) -> bool {
        self.registry.has_binding(abstract_id)
            || self.registry.has_instance(abstract_id)
            || self.types.contains(abstract_id)
    }

    pub fn has_instance(&self, abstract_id: &str) -> bool {
        self.registry.has_instance(abstract_id)
    }

    /// 所有已知标识（绑定、实例、类型描述），排序去重
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .registry
            .binding_ids()
            .chain(self.types.ids())
            .cloned()
            .chain(self.registry.instance_ids())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    // ===== 扩展 =====

    pub fn extend<F>(&mut self, abstract_id: impl Into<String>, extender: F) -> &mut Self
    where
        F: Fn(Instance, &Container) -> Result<Instance, ContainerError> + Send + Sync + 'static,
    {
        let abstract_id = abstract_id.into();
        tracing::debug!(abstract_id = %abstract_id, "Extender registered");
        self.extenders.extend(abstract_id, Arc::new(extender));
        self
    }

    /// 类型化的扩展函数，实例类型不符时报告 `TypeMismatch`
    pub fn extend_as<T, F>(&mut self, abstract_id: impl Into<String>, extender: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>, &Container) -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        let abstract_id = abstract_id.into();
        let target = abstract_id.clone();
        self.extend(abstract_id, move |object, container| {
            let typed = object.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
                target: target.clone(),
                expected: std::any::type_name::<T>().to_string(),
            })?;
            extender(typed, container).map(|value| value as Instance)
        })
    }

    pub fn has_extenders(&self, abstract_id: &str) -> bool {
        self.extenders.has_extenders(abstract_id)
    }

    // ===== 服务提供者 =====

    /// 执行提供者的注册逻辑并保留它，供 [`Container::boot`] 使用
    pub fn register_provider<P>(&mut self, provider: P) -> Result<&mut Self, ContainerError>
    where
        P: ServiceProvider + 'static,
    {
        tracing::debug!(provider = provider.name(), "Registering service provider");
        provider.register(self)?;
        self.providers.push(Arc::new(provider));
        Ok(self)
    }

    /// 按注册顺序启动所有提供者，只执行一次
    pub fn boot(&self) -> Result<(), ContainerError> {
        if self.booted.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for provider in &self.providers {
            tracing::debug!(provider = provider.name(), "Booting service provider");
            provider.boot(self)?;
        }

        Ok(())
    }

    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    // ===== 诊断 =====

    /// 当前线程的构建链快照
    pub fn build_stack(&self) -> Vec<String> {
        self.build_stack.snapshot()
    }

    /// 当前线程正在解析的抽象标识链
    pub fn resolution_chain(&self) -> Vec<String> {
        self.resolving.snapshot()
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        self.stats.snapshot()
    }

    /// 重置统计信息
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.registry.binding_count())
            .field("instances", &self.registry.instance_count())
            .field("providers", &self.provider_names())
            .field("config", &self.config)
            .finish()
    }
}
