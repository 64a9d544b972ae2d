//! 并发解析测试
//!
//! 注册阶段结束后容器放进 `Arc`，在多个阻塞任务中同时解析

#![allow(clippy::uninlined_format_args)]

use futures::future;
use servicebox::errors::ContainerError;
use servicebox::infrastructure::container::{Concrete, Container, Dependency, Instance, TypeDescriptor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Counter {
    id: usize,
}

fn counting_container(creations: Arc<AtomicUsize>) -> Arc<Container> {
    let mut container = Container::new();
    container.singleton(
        "Counter",
        Some(Concrete::factory(move |_, _| {
            let id = creations.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(1));
            Ok(Counter { id })
        })),
    );
    Arc::new(container)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_singleton_resolution_returns_one_instance() {
    let creations = Arc::new(AtomicUsize::new(0));
    let container = counting_container(creations.clone());

    let mut handles = vec![];
    for _ in 0..50 {
        let container_clone = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            container_clone.make("Counter").unwrap()
        }));
    }

    let results = future::join_all(handles).await;
    let cached = container.make("Counter").unwrap();

    // 首次构建可能重复执行，但缓存只保留一个实例
    for result in results {
        let instance = result.unwrap();
        assert!(Arc::ptr_eq(&instance, &cached));
    }
    assert!(creations.load(Ordering::SeqCst) >= 1);

    let counter = cached.downcast::<Counter>().unwrap();
    assert!(counter.id < creations.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_build_stacks_do_not_interleave_across_threads() {
    let mut container = Container::new();
    container.register_abstract("Missing");
    for i in 0..8 {
        container.register_descriptor(TypeDescriptor::concrete(
            format!("Root{}", i),
            vec![Dependency::bound("missing", "Missing")],
            |_| Ok(Arc::new(()) as Instance),
        ));
    }
    let container = Arc::new(container);

    let mut handles = vec![];
    for round in 0..64 {
        let container_clone = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let root = format!("Root{}", round % 8);
            (root.clone(), container_clone.make(&root).err())
        }));
    }

    for result in future::join_all(handles).await {
        let (root, err) = result.unwrap();
        match err {
            Some(ContainerError::NotInstantiable { target, build_stack }) => {
                assert_eq!(target, "Missing");
                assert_eq!(build_stack, vec![root], "build chain leaked between threads");
            }
            other => panic!("Expected NotInstantiable, got {:?}", other),
        }
    }

    assert!(container.build_stack().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stats_are_counted() {
    let creations = Arc::new(AtomicUsize::new(0));
    let container = counting_container(creations);

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let container_clone = container.clone();
            tokio::task::spawn_blocking(move || container_clone.make("Counter").is_ok())
        })
        .collect();

    let results = future::join_all(handles).await;
    assert!(results.into_iter().all(|r| r.unwrap()));

    let stats = container.stats();
    assert_eq!(stats.total_resolutions, 100);
    assert_eq!(stats.cache_hits + stats.cache_misses, 100);
}
