//! 容器统计信息

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
pub(crate) struct InnerStats {
    total_resolutions: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    factory_invocations: AtomicU64,
    factory_failures: AtomicU64,
    cycles_detected: AtomicU64,
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

    pub(crate) fn record_invocation(&self) {
        self.factory_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.factory_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, registered: usize, resolved: usize) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            factory_invocations: self.factory_invocations.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            cycles_detected: self.cycles_detected.load(Ordering::Relaxed),
            registered,
            resolved,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 总解析次数（含嵌套解析）
    pub total_resolutions: u64,
    /// 命中已有实例的次数
    pub cache_hits: u64,
    /// 需要等待或运行工厂的次数
    pub cache_misses: u64,
    /// 工厂实际执行次数
    pub factory_invocations: u64,
    /// 工厂失败次数
    pub factory_failures: u64,
    /// 检测到的循环依赖次数
    pub cycles_detected: u64,
    /// 已注册绑定数量
    pub registered: usize,
    /// 已持有实例的绑定数量
    pub resolved: usize,
}

impl ContainerStats {
    pub fn total(&self) -> u64 {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }

    /// 获取性能指标摘要
    pub fn summary(&self) -> String {
        format!(
            "{} resolutions, {:.1}% cache hit rate, {} factory calls ({} failed), {}/{} bindings resolved",
            self.total_resolutions,
            self.hit_rate() * 100.0,
            self.factory_invocations,
            self.factory_failures,
            self.resolved,
            self.registered
        )
    }
}
