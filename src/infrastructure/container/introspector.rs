//! 类型描述注册表
//!
//! Rust 没有运行时反射，构造函数形状通过显式注册获得：
//! - 实现 [`Injectable`] 的类型由 `register_type` 自动生成描述
//! - 接口/抽象角色通过 `register_abstract` 标记为不可实例化
//! - 其余情况可以直接提交手写的 [`TypeDescriptor`]

use super::parameters::Arguments;
use super::{Concrete, Instance};
use crate::errors::ContainerError;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// 构造函数：接收按声明顺序解析好的参数
pub type Constructor = Arc<dyn Fn(Arguments) -> Result<Instance, ContainerError> + Send + Sync>;

/// 构造参数描述
#[derive(Clone)]
pub struct Dependency {
    /// 参数名，用于匹配覆盖参数
    pub name: String,
    /// 需要的类型标识，标量参数为 `None`
    pub required_type: Option<String>,
    /// 声明时给出的默认值
    pub default: Option<Instance>,
}

impl Dependency {
    /// 依赖一个可注入类型
    pub fn on<T: Injectable>(name: impl Into<String>) -> Self {
        Self::bound(name, T::key())
    }

    /// 依赖任意标识（通常是接口名）
    pub fn bound(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_type: Some(type_id.into()),
            default: None,
        }
    }

    /// 无类型约束的参数，只能通过覆盖参数或默认值满足
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_type: None,
            default: None,
        }
    }

    pub fn with_default<T: Any + Send + Sync>(self, value: T) -> Self {
        self.with_default_instance(Arc::new(value))
    }

    pub fn with_default_instance(mut self, value: Instance) -> Self {
        self.default = Some(value);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("required_type", &self.required_type)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// 类型形状
#[derive(Clone)]
pub enum TypeShape {
    /// 接口或抽象类型，不能直接实例化
    Abstract,
    /// 具体类型
    Concrete {
        dependencies: Vec<Dependency>,
        constructor: Constructor,
    },
}

/// 单个类型的构造描述
#[derive(Clone)]
pub struct TypeDescriptor {
    pub id: String,
    pub shape: TypeShape,
}

impl TypeDescriptor {
    pub fn abstract_type(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shape: TypeShape::Abstract,
        }
    }

    pub fn concrete<F>(id: impl Into<String>, dependencies: Vec<Dependency>, constructor: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, ContainerError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            shape: TypeShape::Concrete {
                dependencies,
                constructor: Arc::new(constructor),
            },
        }
    }

    /// 由 [`Injectable`] 实现生成描述
    pub fn of<T: Injectable>() -> Self {
        Self::concrete(T::key(), T::dependencies(), |args| {
            T::construct(args).map(|value| Arc::new(value) as Instance)
        })
    }

    pub fn is_instantiable(&self) -> bool {
        matches!(self.shape, TypeShape::Concrete { .. })
    }
}

/// 可由容器自动构建的类型
pub trait Injectable: Any + Send + Sync + Sized {
    /// 类型标识，默认使用完整类型名
    fn key() -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// 构造参数，按声明顺序
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// 用解析好的参数构造实例
    fn construct(args: Arguments) -> Result<Self, ContainerError>;
}

/// `describe_constructor` 的结果
pub enum ConstructorInfo<'a> {
    /// 未注册或抽象类型
    NotInstantiable,
    Instantiable {
        dependencies: &'a [Dependency],
        constructor: &'a Constructor,
    },
}

/// 类型描述注册表
#[derive(Default)]
pub struct TypeRegistry {
    descriptors: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.descriptors.insert(descriptor.id.clone(), descriptor);
    }

    pub fn get(&self, id: &str) -> Option<&TypeDescriptor> {
        self.descriptors.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.descriptors.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.descriptors.keys()
    }

    /// 工厂函数，或者已经没有间接层的类型自身，可以直接构建
    pub fn is_directly_constructible(concrete: &Concrete, abstract_id: &str) -> bool {
        match concrete {
            Concrete::Factory(_) => true,
            Concrete::Type(id) => id == abstract_id,
        }
    }

    /// 描述具体类型的构造函数
    pub fn describe_constructor(&self, concrete_id: &str) -> ConstructorInfo<'_> {
        match self.descriptors.get(concrete_id).map(|d| &d.shape) {
            Some(TypeShape::Concrete {
                dependencies,
                constructor,
            }) => ConstructorInfo::Instantiable {
                dependencies,
                constructor,
            },
            Some(TypeShape::Abstract) | None => ConstructorInfo::NotInstantiable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock;

    impl Injectable for Clock {
        fn key() -> String {
            "Clock".to_string()
        }

        fn construct(_args: Arguments) -> Result<Self, ContainerError> {
            Ok(Clock)
        }
    }

    #[test]
    fn test_injectable_descriptor() {
        let descriptor = TypeDescriptor::of::<Clock>();
        assert_eq!(descriptor.id, "Clock");
        assert!(descriptor.is_instantiable());
    }

    #[test]
    fn test_default_key_is_type_name() {
        struct Unnamed;
        impl Injectable for Unnamed {
            fn construct(_args: Arguments) -> Result<Self, ContainerError> {
                Ok(Unnamed)
            }
        }

        assert!(Unnamed::key().ends_with("Unnamed"));
    }

    #[test]
    fn test_describe_constructor() {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDescriptor::of::<Clock>());
        registry.insert(TypeDescriptor::abstract_type("Logger"));

        assert!(matches!(
            registry.describe_constructor("Clock"),
            ConstructorInfo::Instantiable { dependencies, .. } if dependencies.is_empty()
        ));
        assert!(matches!(registry.describe_constructor("Logger"), ConstructorInfo::NotInstantiable));
        assert!(matches!(registry.describe_constructor("Missing"), ConstructorInfo::NotInstantiable));
    }

    #[test]
    fn test_is_directly_constructible() {
        assert!(TypeRegistry::is_directly_constructible(&Concrete::Type("Clock".into()), "Clock"));
        assert!(!TypeRegistry::is_directly_constructible(&Concrete::Type("SystemClock".into()), "Clock"));

        let factory = Concrete::factory(|_, _| Ok(Clock));
        assert!(TypeRegistry::is_directly_constructible(&factory, "Clock"));
    }

    #[test]
    fn test_dependency_builders() {
        let dep = Dependency::on::<Clock>("clock");
        assert_eq!(dep.required_type.as_deref(), Some("Clock"));
        assert!(!dep.has_default());

        let scalar = Dependency::value("retries").with_default(3u32);
        assert!(scalar.required_type.is_none());
        assert!(scalar.has_default());
    }
}
