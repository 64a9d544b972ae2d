//! 简单的容器测试
//!
//! 验证示例服务提供者与类型化辅助方法的基本功能

#![allow(clippy::uninlined_format_args)]

use servicebox::app::{
    ClickService, ClickTrackingProvider, FinanceService, InMemoryClickStore, WebhookService, CLICK_STORE,
};
use servicebox::config::ContainerConfig;
use servicebox::{Container, ContainerError, Injectable, Parameters, ServiceProvider};
use std::collections::HashMap;
use std::sync::Arc;

fn click(id: &str) -> HashMap<String, String> {
    [
        ("click_id", id),
        ("offer_id", "7"),
        ("source", "ads"),
        ("timestamp", "2024-05-01T08:00:00Z"),
        ("signature", "sig"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn booted() -> Container {
    let mut container = Container::new();
    container.register_provider(ClickTrackingProvider::new()).unwrap();
    container.boot().unwrap();
    container
}

#[test]
fn test_provider_registers_click_services() {
    let container = booted();

    assert!(container.is_booted());
    assert_eq!(container.provider_names(), vec!["click-tracking"]);
    for id in [CLICK_STORE, "ClickService", "WebhookService", "FinanceService"] {
        assert!(container.bound(id), "{} should be bound", id);
        assert!(container.is_shared(id), "{} should be shared", id);
    }
}

#[test]
fn test_singleton_services() {
    let container = booted();

    let first = container.resolve::<ClickService>().unwrap();
    let second = container.resolve::<ClickService>().unwrap();
    let finance = container.resolve::<FinanceService>().unwrap();
    let store = container
        .make_as::<InMemoryClickStore>(CLICK_STORE, &Parameters::new())
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.store(), &store));

    assert!(first.process_click(&click("c-1")));
    assert_eq!(store.len(), 1);
    assert!(finance.payload_for_date("2024-05-01").is_some());
}

#[test]
fn test_store_interface_is_not_instantiable_without_provider() {
    let mut container = Container::new();
    container
        .register_abstract(CLICK_STORE)
        .register_type::<ClickService>();

    let err = container.resolve::<ClickService>().err().unwrap();
    assert_eq!(
        err.to_string(),
        "Target [ClickStore] is not instantiable while building [ClickService]."
    );
}

#[test]
fn test_typed_resolution_mismatch() {
    let container = booted();

    let result = container.make_as::<WebhookService>(&ClickService::key(), &Parameters::new());
    match result {
        Err(ContainerError::TypeMismatch { target, expected }) => {
            assert_eq!(target, "ClickService");
            assert!(expected.ends_with("WebhookService"));
        }
        _ => panic!("Expected TypeMismatch"),
    }
}

#[test]
fn test_stats_reset() {
    let container = booted();
    container.resolve::<ClickService>().unwrap();
    assert!(container.stats().total() > 0);

    container.reset_stats();
    assert_eq!(container.stats().total(), 0);
}

#[test]
fn test_cycle_detection_can_be_disabled_in_config() {
    let config = ContainerConfig {
        detect_cycles: false,
        ..ContainerConfig::default()
    };
    let container = Container::with_config(config.clone());

    assert_eq!(container.config(), &config);
    assert!(!container.config().detect_cycles);
}

#[test]
fn test_custom_provider_boot_failure() {
    struct Strict;

    impl ServiceProvider for Strict {
        fn name(&self) -> &str {
            "strict"
        }

        fn register(&self, _container: &mut Container) -> Result<(), ContainerError> {
            Ok(())
        }

        fn boot(&self, container: &Container) -> Result<(), ContainerError> {
            container.make("NotRegistered").map(|_| ())
        }
    }

    let mut container = Container::new();
    container.register_provider(Strict).unwrap();

    let err = container.boot().err().unwrap();
    assert!(matches!(err, ContainerError::NotInstantiable { .. }));
}
