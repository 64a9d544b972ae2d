//! 构建后扩展钩子

use super::{Container, Instance};
use crate::errors::ContainerError;
use std::collections::HashMap;
use std::sync::Arc;

/// 扩展函数：接收刚构建好的实例，返回替换后的实例
pub type Extender =
    Arc<dyn Fn(Instance, &Container) -> Result<Instance, ContainerError> + Send + Sync>;

/// 按抽象标识分组的扩展函数，组内保持注册顺序
#[derive(Default)]
pub struct ExtenderSet {
    hooks: HashMap<String, Vec<Extender>>,
}

impl ExtenderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, abstract_id: String, extender: Extender) {
        self.hooks.entry(abstract_id).or_default().push(extender);
    }

    pub fn has_extenders(&self, abstract_id: &str) -> bool {
        self.hooks
            .get(abstract_id)
            .map(|hooks| !hooks.is_empty())
            .unwrap_or(false)
    }

    pub fn count(&self, abstract_id: &str) -> usize {
        self.hooks.get(abstract_id).map(Vec::len).unwrap_or(0)
    }

    /// 依次应用扩展函数，每个接收上一个的输出
    pub fn apply(
        &self,
        abstract_id: &str,
        object: Instance,
        container: &Container,
    ) -> Result<Instance, ContainerError> {
        let Some(hooks) = self.hooks.get(abstract_id) else {
            return Ok(object);
        };

        hooks
            .iter()
            .try_fold(object, |current, extender| extender(current, container))
    }
}
