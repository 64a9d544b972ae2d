use std::sync::atomic::{AtomicUsize, Ordering};

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
pub(crate) struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    builds: AtomicUsize,
    defaults_used: AtomicUsize,
}

impl InnerStats {
    pub(crate) fn record_resolution(&self) {
        self.total_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_build(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_default(&self) {
        self.defaults_used.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            defaults_used: self.defaults_used.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.total_resolutions.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.builds.store(0, Ordering::Relaxed);
        self.defaults_used.store(0, Ordering::Relaxed);
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// `make` 调用次数（包括嵌套依赖）
    pub total_resolutions: usize,
    /// 命中实例缓存的次数
    pub cache_hits: usize,
    /// 未命中实例缓存的次数
    pub cache_misses: usize,
    /// 通过类型描述构建实例的次数（不含工厂）
    pub builds: usize,
    /// 构造参数改用声明默认值的次数
    pub defaults_used: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// 获取性能指标摘要
    pub fn performance_summary(&self) -> String {
        format!(
            "Container Performance: {} total resolutions, {:.1}% cache hit rate, {} builds",
            self.total_resolutions,
            self.hit_rate() * 100.0,
            self.builds
        )
    }
}
