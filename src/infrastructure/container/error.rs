//! 容器错误类型

use std::time::Duration;
use thiserror::Error;

/// 工厂自身返回的失败
pub type FactoryFailure = Box<dyn std::error::Error + Send + Sync>;

/// 依赖注入容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 名称没有任何绑定
    #[error("Unknown dependency: '{0}'")]
    UnknownDependency(String),

    /// 名称已绑定（值或工厂）
    #[error("Dependency '{0}' is already bound")]
    DuplicateBinding(String),

    /// 解析链回到了正在解析的名称
    #[error("Cyclic dependency detected: {}", .path.join(" -> "))]
    CyclicDependency {
        /// 从首次出现到再次遇到的名称序列
        path: Vec<String>,
    },

    /// 工厂执行失败
    #[error("Factory for '{name}' failed: {source}")]
    FactoryFailed {
        name: String,
        #[source]
        source: FactoryFailure,
    },

    /// 实例类型与请求类型不符
    #[error("Dependency '{name}' is not of type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// 调用方给定的期限内未完成解析
    #[error("Resolution of '{name}' timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },
}

impl ContainerError {
    /// 工厂失败时是否可以重试
    ///
    /// 只有工厂失败与超时不影响后续解析；其余错误说明接线本身有问题。
    pub fn is_retryable(&self) -> bool {
        matches!(self, ContainerError::FactoryFailed { .. } | ContainerError::Timeout { .. })
    }

    /// 包装 `name` 的工厂返回的失败
    ///
    /// 工厂用 `?` 传出的嵌套解析错误会被装箱返回，这里拆箱还原，
    /// 调用方看到的是最内层的错误类型和名称。
    pub(crate) fn from_factory(name: &str, failure: FactoryFailure) -> Self {
        match failure.downcast::<ContainerError>() {
            Ok(nested) => *nested,
            Err(source) => ContainerError::FactoryFailed {
                name: name.to_string(),
                source,
            },
        }
    }
}
