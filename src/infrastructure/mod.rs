//! 基础设施层
//!
//! 提供依赖注入容器：按名称注册值与工厂，惰性解析并缓存。

pub mod container;

// 重新导出API
pub use container::{ContainerError, ContainerStats, Resolver, ServiceContainer};
pub use container::{Dependencies, FactoryFailure, Instance, ServiceFactory};
