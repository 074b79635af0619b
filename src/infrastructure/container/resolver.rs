//! 解析器与解析路径
//!
//! 每次顶层 `resolve` 都会生成一个新的帧和空路径；工厂运行在自己的帧里，拿到的
//! `Resolver` 携带到当前名称为止的路径，嵌套解析沿路径向下传递。路径属于单次
//! 调用，不在并发调用之间共享。
//!
//! 工厂的 future 在任务本地变量里登记当前帧，所以工厂内部即使通过容器句柄
//! 而不是 `Resolver` 解析，也仍然挂在同一条调用链上。

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ContainerError;
use super::factory::{downcast_instance, Instance};
use super::ServiceContainer;

/// 单次解析调用链上的名称序列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPath {
    names: Vec<String>,
}

impl ResolutionPath {
    /// 名称是否正在当前调用链上解析
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// 若 `name` 已在路径上，返回从其首次出现到再次遇到的环
    pub fn cycle_to(&self, name: &str) -> Option<Vec<String>> {
        let mut cycle = self.tail_from(name)?;
        cycle.push(name.to_string());
        Some(cycle)
    }

    /// 从 `name` 首次出现处开始的路径片段
    fn tail_from(&self, name: &str) -> Option<Vec<String>> {
        let start = self.names.iter().position(|n| n == name)?;
        Some(self.names[start..].to_vec())
    }

    pub(crate) fn child(&self, name: &str) -> Self {
        let mut names = Vec::with_capacity(self.names.len() + 1);
        names.extend_from_slice(&self.names);
        names.push(name.to_string());
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// 当前正在构建的名称
    pub fn current(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(" -> "))
    }
}

/// 一次工厂执行（或一次顶层调用）的身份与解析路径
#[derive(Debug, Clone)]
pub(crate) struct ResolutionFrame {
    pub(crate) id: Uuid,
    pub(crate) path: ResolutionPath,
}

impl ResolutionFrame {
    pub(crate) fn root() -> Self {
        Self {
            id: Uuid::new_v4(),
            path: ResolutionPath::default(),
        }
    }

    /// 构建 `name` 的新帧
    pub(crate) fn child(&self, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: self.path.child(name),
        }
    }

    /// 当前任务正在运行的工厂帧；不在工厂内时新建顶层帧
    pub(crate) fn current_or_root() -> Self {
        CURRENT_FRAME
            .try_with(Clone::clone)
            .unwrap_or_else(|_| Self::root())
    }

    pub(crate) async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT_FRAME.scope(self, fut).await
    }
}

tokio::task_local! {
    static CURRENT_FRAME: ResolutionFrame;
}

/// 传给工厂的解析句柄
///
/// 指向同一个容器，工厂通过它按名称请求自己的依赖。
#[derive(Clone)]
pub struct Resolver {
    container: ServiceContainer,
    frame: ResolutionFrame,
}

impl Resolver {
    pub(crate) fn new(container: ServiceContainer, frame: ResolutionFrame) -> Self {
        Self { container, frame }
    }

    /// 在当前调用链上解析依赖
    pub async fn resolve(&self, name: &str) -> Result<Instance, ContainerError> {
        self.container.resolve_in(name, &self.frame).await
    }

    /// 解析并转换为具体类型
    pub async fn resolve_as<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, ContainerError> {
        let instance = self.resolve(name).await?;
        downcast_instance(name, instance)
    }

    pub fn path(&self) -> &ResolutionPath {
        &self.frame.path
    }

    /// 当前工厂帧的ID，每次工厂执行各不相同
    pub fn id(&self) -> Uuid {
        self.frame.id
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("id", &self.frame.id)
            .field("path", &self.frame.path.names)
            .finish()
    }
}
