//! 服务提供者
//!
//! 把一组相关的绑定集中到一处注册，启动阶段再做需要已注册服务的初始化工作。

use super::container::Container;
use crate::errors::ContainerError;

/// 服务提供者接口
pub trait ServiceProvider: Send + Sync {
    /// 提供者名称，用于日志和错误信息
    fn name(&self) -> &str;

    /// 注册绑定、类型描述和扩展函数
    fn register(&self, container: &mut Container) -> Result<(), ContainerError>;

    /// 所有提供者注册完成后调用
    fn boot(&self, _container: &Container) -> Result<(), ContainerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::container::Concrete;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CounterProvider {
        boots: Arc<AtomicUsize>,
    }

    impl ServiceProvider for CounterProvider {
        fn name(&self) -> &str {
            "counter"
        }

        fn register(&self, container: &mut Container) -> Result<(), ContainerError> {
            container.singleton("counter", Some(Concrete::factory(|_, _| Ok(AtomicUsize::new(0)))));
            Ok(())
        }

        fn boot(&self, container: &Container) -> Result<(), ContainerError> {
            self.boots.fetch_add(1, Ordering::SeqCst);
            let counter = container.make("counter")?;
            if counter.downcast::<AtomicUsize>().is_err() {
                return Err(ContainerError::Provider {
                    provider: self.name().to_string(),
                    reason: "counter has unexpected type".to_string(),
                });
            }
            Ok(())
        }
    }

    struct FailingProvider;

    impl ServiceProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn register(&self, _container: &mut Container) -> Result<(), ContainerError> {
            Err(ContainerError::Provider {
                provider: self.name().to_string(),
                reason: "missing configuration".to_string(),
            })
        }
    }

    #[test]
    fn test_provider_registers_and_boots_once() {
        let boots = Arc::new(AtomicUsize::new(0));
        let mut container = Container::new();
        container
            .register_provider(CounterProvider { boots: boots.clone() })
            .unwrap();

        assert!(container.bound("counter"));
        assert!(!container.is_booted());

        container.boot().unwrap();
        container.boot().unwrap();

        assert!(container.is_booted());
        assert_eq!(boots.load(Ordering::SeqCst), 1);
        assert_eq!(container.provider_names(), vec!["counter"]);
    }

    #[test]
    fn test_failing_provider_is_not_kept() {
        let mut container = Container::new();
        let result = container.register_provider(FailingProvider);

        match result {
            Err(ContainerError::Provider { provider, reason }) => {
                assert_eq!(provider, "failing");
                assert_eq!(reason, "missing configuration");
            }
            _ => panic!("Expected provider error"),
        }
        assert!(container.provider_names().is_empty());
    }
}
