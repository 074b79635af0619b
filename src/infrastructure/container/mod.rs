//! 依赖注入容器
//!
//! 按名称绑定依赖，支持：
//! - 直接注册的值
//! - 惰性执行、结果按名称缓存的工厂（每个名称最多执行一次）
//! - 工厂通过 `Resolver` 按名称解析自己的依赖
//! - 单次调用链与跨调用方的循环依赖检测

mod error;
mod factory;
mod graph;
mod in_flight;
mod resolver;
mod stats;

pub use error::{ContainerError, FactoryFailure};
pub use factory::{Dependencies, FnServiceFactory, InjectedFactory, Instance, ServiceFactory};
pub use graph::{DependencyGraph, GraphNode};
pub use resolver::{ResolutionPath, Resolver};
pub use stats::ContainerStats;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use factory::downcast_instance;
use in_flight::InFlight;
use resolver::ResolutionFrame;
use stats::InnerStats;

/// 名称绑定
enum Binding {
    /// 直接注册的实例
    Value(Instance),
    /// 工厂及其缓存
    Factory(Arc<FactorySlot>),
}

struct FactorySlot {
    factory: Box<dyn ServiceFactory>,
    /// 使用OnceCell确保只创建一次；失败或取消时保持为空
    cell: OnceCell<Instance>,
}

enum Lookup {
    Ready(Instance),
    Pending(Arc<FactorySlot>),
}

/// 服务容器
///
/// 克隆开销很小，所有克隆共享同一张绑定表。
#[derive(Clone)]
pub struct ServiceContainer {
    /// 绑定表 - 值与工厂共用一个命名空间
    bindings: Arc<DashMap<String, Binding>>,
    /// 跨调用方的构建/等待记录
    in_flight: Arc<InFlight>,
    stats: Arc<InnerStats>,
}

impl ServiceContainer {
    /// 创建新的容器实例
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(DashMap::new()),
            in_flight: Arc::new(InFlight::default()),
            stats: Arc::new(InnerStats::default()),
        }
    }

    /// 绑定一个具体值
    pub fn register_value<T: Send + Sync + 'static>(
        &self,
        name: &str,
        value: T,
    ) -> Result<(), ContainerError> {
        self.register_instance(name, Arc::new(value))
    }

    /// 绑定一个已擦除类型的实例
    pub fn register_instance(&self, name: &str, instance: Instance) -> Result<(), ContainerError> {
        self.bind(name, Binding::Value(instance))
    }

    /// 绑定一个工厂，工厂收到指向本容器的 `Resolver`
    ///
    /// ```ignore
    /// container.register_factory("authModel", |r: Resolver| async move {
    ///     let store = r.resolve_as::<MemoryStore>("redis").await?;
    ///     Ok(AuthModel::new(store))
    /// })?;
    /// ```
    pub fn register_factory<T, F, Fut>(&self, name: &str, factory: F) -> Result<(), ContainerError>
    where
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FactoryFailure>> + Send + 'static,
        T: Send + Sync + 'static,
    {
        self.register_provider(name, FnServiceFactory::new(factory))
    }

    /// 绑定一个声明了依赖名称的工厂，容器按声明顺序解析后注入
    pub fn register_injected<T, F>(
        &self,
        name: &str,
        dependencies: &[&str],
        factory: F,
    ) -> Result<(), ContainerError>
    where
        F: Fn(Dependencies) -> Result<T, FactoryFailure> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register_provider(name, InjectedFactory::new(dependencies, factory))
    }

    /// 绑定任意 `ServiceFactory` 实现
    pub fn register_provider<P>(&self, name: &str, provider: P) -> Result<(), ContainerError>
    where
        P: ServiceFactory + 'static,
    {
        self.bind(
            name,
            Binding::Factory(Arc::new(FactorySlot {
                factory: Box::new(provider),
                cell: OnceCell::new(),
            })),
        )
    }

    fn bind(&self, name: &str, binding: Binding) -> Result<(), ContainerError> {
        match self.bindings.entry(name.to_string()) {
            Entry::Occupied(_) => {
                warn!(name, "Rejected duplicate binding");
                Err(ContainerError::DuplicateBinding(name.to_string()))
            }
            Entry::Vacant(entry) => {
                let kind = match &binding {
                    Binding::Value(_) => "value",
                    Binding::Factory(_) => "factory",
                };
                entry.insert(binding);
                debug!(name, kind, "Registered binding");
                Ok(())
            }
        }
    }

    /// 解析服务 - 主要API
    ///
    /// 在工厂内部调用时沿用该工厂的调用链，循环依赖照常检测。
    pub async fn resolve(&self, name: &str) -> Result<Instance, ContainerError> {
        self.resolve_in(name, &ResolutionFrame::current_or_root())
            .await
    }

    /// 解析并转换为具体类型
    pub async fn resolve_as<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, ContainerError> {
        let instance = self.resolve(name).await?;
        downcast_instance(name, instance)
    }

    /// 在给定期限内解析；超时后名称保持未缓存，下次解析重新执行工厂
    pub async fn resolve_timeout(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Instance, ContainerError> {
        match tokio::time::timeout(timeout, self.resolve(name)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(name, ?timeout, "Resolution timed out");
                Err(ContainerError::Timeout {
                    name: name.to_string(),
                    timeout,
                })
            }
        }
    }

    /// 按名称顺序解析全部绑定，返回第一个失败
    pub async fn warm_up(&self) -> Result<(), ContainerError> {
        for name in self.names() {
            self.resolve(&name).await?;
        }
        debug!(bindings = self.len(), "Container warmed up");
        Ok(())
    }

    pub(crate) async fn resolve_in(
        &self,
        name: &str,
        frame: &ResolutionFrame,
    ) -> Result<Instance, ContainerError> {
        self.stats.record_resolution();

        let slot = match self.lookup(name)? {
            Lookup::Ready(instance) => {
                self.stats.record_hit();
                return Ok(instance);
            }
            Lookup::Pending(slot) => slot,
        };

        if let Some(cycle) = frame.path.cycle_to(name) {
            return Err(self.cycle_error(cycle));
        }

        self.stats.record_miss();

        let _wait = self.in_flight.begin_wait(frame.id, name);
        if let Some(cycle) = self
            .in_flight
            .find_cycle(frame.id, frame.path.current(), name)
        {
            return Err(self.cycle_error(cycle));
        }

        let instance = slot
            .cell
            .get_or_try_init(|| self.build(name, frame.child(name), slot.factory.as_ref()))
            .await?;

        Ok(Arc::clone(instance))
    }

    fn lookup(&self, name: &str) -> Result<Lookup, ContainerError> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| ContainerError::UnknownDependency(name.to_string()))?;

        Ok(match binding.value() {
            Binding::Value(instance) => Lookup::Ready(Arc::clone(instance)),
            Binding::Factory(slot) => match slot.cell.get() {
                Some(instance) => Lookup::Ready(Arc::clone(instance)),
                None => Lookup::Pending(Arc::clone(slot)),
            },
        })
    }

    async fn build(
        &self,
        name: &str,
        frame: ResolutionFrame,
        factory: &dyn ServiceFactory,
    ) -> Result<Instance, ContainerError> {
        let _build = self.in_flight.begin_build(name, frame.id);
        self.stats.record_invocation();
        debug!(
            name,
            depth = frame.path.depth(),
            service_type = factory.service_type_name(),
            "Invoking factory"
        );

        let resolver = Resolver::new(self.clone(), frame.clone());
        match frame.scope(factory.create(resolver)).await {
            Ok(instance) => {
                debug!(name, "Factory completed");
                Ok(instance)
            }
            Err(failure) => {
                self.stats.record_failure();
                let err = ContainerError::from_factory(name, failure);
                warn!(name, error = %err, "Factory failed, binding left unresolved");
                Err(err)
            }
        }
    }

    fn cycle_error(&self, path: Vec<String>) -> ContainerError {
        self.stats.record_cycle();
        let err = ContainerError::CyclicDependency { path };
        warn!(error = %err, "Resolution aborted");
        err
    }

    /// 名称是否已绑定
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// 名称是否已有实例（值绑定或已缓存的工厂）
    pub fn is_resolved(&self, name: &str) -> bool {
        self.bindings
            .get(name)
            .map(|binding| match binding.value() {
                Binding::Value(_) => true,
                Binding::Factory(slot) => slot.cell.initialized(),
            })
            .unwrap_or(false)
    }

    /// 已绑定的名称（排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        let resolved = self
            .bindings
            .iter()
            .filter(|e| match e.value() {
                Binding::Value(_) => true,
                Binding::Factory(slot) => slot.cell.initialized(),
            })
            .count();
        self.stats.snapshot(self.bindings.len(), resolved)
    }

    /// 当前绑定的依赖图快照
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        for entry in self.bindings.iter() {
            match entry.value() {
                Binding::Value(_) => graph.add_value(entry.key()),
                Binding::Factory(slot) => graph.add_factory(
                    entry.key(),
                    slot.factory.service_type_name(),
                    slot.factory.dependencies().map(<[String]>::to_vec),
                ),
            }
        }
        graph
    }

    /// 不执行任何工厂，检查声明的依赖是否都已绑定且无环
    pub fn validate(&self) -> Result<(), ContainerError> {
        self.dependency_graph().validate()
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("bindings", &self.names())
            .finish()
    }
}
