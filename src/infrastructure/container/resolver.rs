//! 递归解析
//!
//! `make` 先查实例缓存，再按绑定决定直接构建还是沿别名继续解析；
//! 构建完成后应用扩展钩子，共享绑定写入缓存。

use super::introspector::{ConstructorInfo, Dependency, TypeRegistry};
use super::parameters::{Arguments, Parameters};
use super::{Concrete, Container, Injectable, Instance};
use crate::errors::ContainerError;
use std::any::Any;
use std::sync::Arc;

/// 单个构造参数的解析结果
enum ParameterOutcome {
    Resolved(Instance),
    /// 按类型解析失败（或无类型），改用声明的默认值
    UseDefault(Instance),
}

impl Container {
    /// 解析标识，不带覆盖参数
    pub fn make(&self, abstract_id: &str) -> Result<Instance, ContainerError> {
        self.make_with(abstract_id, &Parameters::new())
    }

    /// 解析标识，`parameters` 只作用于这一次构建的直接参数
    pub fn make_with(
        &self,
        abstract_id: &str,
        parameters: &Parameters,
    ) -> Result<Instance, ContainerError> {
        self.resolve_abstract(abstract_id, parameters)
    }

    /// 解析并转换为具体类型
    pub fn make_as<T: Any + Send + Sync>(
        &self,
        abstract_id: &str,
        parameters: &Parameters,
    ) -> Result<Arc<T>, ContainerError> {
        let object = self.make_with(abstract_id, parameters)?;
        object.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            target: abstract_id.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// 按可注入类型自身的标识解析
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>, ContainerError> {
        self.make_as::<T>(&T::key(), &Parameters::new())
    }

    fn resolve_abstract(
        &self,
        abstract_id: &str,
        parameters: &Parameters,
    ) -> Result<Instance, ContainerError> {
        if self.config.collect_stats {
            self.stats.record_resolution();
        }

        // 缓存命中直接返回，不再理会覆盖参数
        if let Some(cached) = self.registry.cached(abstract_id) {
            if self.config.collect_stats {
                self.stats.record_hit();
            }
            tracing::trace!(abstract_id, "Instance cache hit");
            return Ok(cached);
        }
        if self.config.collect_stats {
            self.stats.record_miss();
        }

        // 别名、工厂和构造参数里的嵌套 `make` 都经过这里
        let _guard = if self.config.detect_cycles {
            if self.resolving.contains(abstract_id) {
                let mut chain = self.resolving.snapshot();
                chain.push(abstract_id.to_string());
                return Err(ContainerError::CyclicDependency {
                    target: abstract_id.to_string(),
                    chain,
                });
            }
            Some(self.resolving.enter(abstract_id))
        } else {
            None
        };

        let concrete = self.registry.get_concrete(abstract_id);
        let object = match &concrete {
            Concrete::Type(target) if !TypeRegistry::is_directly_constructible(&concrete, abstract_id) => {
                tracing::trace!(abstract_id, target = %target, "Following alias");
                self.resolve_abstract(target, parameters)?
            }
            _ => self.build(&concrete, parameters)?,
        };

        let object = self.extenders.apply(abstract_id, object, self)?;

        if self.registry.is_shared(abstract_id) {
            tracing::debug!(abstract_id, "Caching shared instance");
            return Ok(self.registry.store_shared(abstract_id, object));
        }

        Ok(object)
    }

    /// 构建具体目标：工厂直接调用，类型按构造描述递归解析参数
    pub fn build(&self, concrete: &Concrete, parameters: &Parameters) -> Result<Instance, ContainerError> {
        match concrete {
            Concrete::Factory(factory) => factory(self, parameters),
            Concrete::Type(concrete_id) => self.build_type(concrete_id, parameters),
        }
    }

    fn build_type(&self, concrete_id: &str, parameters: &Parameters) -> Result<Instance, ContainerError> {
        if self.config.detect_cycles && self.build_stack.contains(concrete_id) {
            let mut chain = self.build_stack.snapshot();
            chain.push(concrete_id.to_string());
            return Err(ContainerError::CyclicDependency {
                target: concrete_id.to_string(),
                chain,
            });
        }

        let (dependencies, constructor) = match self.types.describe_constructor(concrete_id) {
            ConstructorInfo::Instantiable {
                dependencies,
                constructor,
            } => (dependencies, constructor),
            ConstructorInfo::NotInstantiable => {
                return Err(ContainerError::NotInstantiable {
                    target: concrete_id.to_string(),
                    build_stack: self.build_stack.snapshot(),
                });
            }
        };

        if self.config.collect_stats {
            self.stats.record_build();
        }

        let arguments = {
            let _guard = self.build_stack.enter(concrete_id);
            let mut arguments = Vec::with_capacity(dependencies.len());
            for dependency in dependencies {
                let value = match self.resolve_parameter(concrete_id, dependency, parameters)? {
                    ParameterOutcome::Resolved(value) => value,
                    ParameterOutcome::UseDefault(value) => {
                        if self.config.collect_stats {
                            self.stats.record_default();
                        }
                        value
                    }
                };
                arguments.push((dependency.name.clone(), value));
            }
            arguments
        };

        tracing::debug!(
            concrete = concrete_id,
            arguments = arguments.len(),
            "Constructing instance"
        );
        constructor(Arguments::new(concrete_id, arguments))
    }

    fn resolve_parameter(
        &self,
        concrete_id: &str,
        dependency: &Dependency,
        parameters: &Parameters,
    ) -> Result<ParameterOutcome, ContainerError> {
        if let Some(value) = parameters.get(&dependency.name) {
            return Ok(ParameterOutcome::Resolved(value.clone()));
        }

        match (&dependency.required_type, &dependency.default) {
            (Some(type_id), default) => match self.make(type_id) {
                Ok(value) => Ok(ParameterOutcome::Resolved(value)),
                Err(err) => match default {
                    Some(default) if err.allows_default_fallback() => {
                        tracing::warn!(
                            concrete = concrete_id,
                            parameter = %dependency.name,
                            error = %err,
                            "Dependency unresolved, using default value"
                        );
                        Ok(ParameterOutcome::UseDefault(default.clone()))
                    }
                    _ => Err(err),
                },
            },
            (None, Some(default)) => Ok(ParameterOutcome::UseDefault(default.clone())),
            (None, None) => Err(ContainerError::UnresolvedDependency {
                parameter: dependency.name.clone(),
                target: concrete_id.to_string(),
            }),
        }
    }
}
