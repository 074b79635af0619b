//! 服务工厂
//!
//! 两种工厂形态：
//! - `FnServiceFactory`：接收 `Resolver`，在工厂内部按名称解析依赖（服务定位器风格）
//! - `InjectedFactory`：预先声明依赖名称，由容器解析后注入（依赖注入风格）

use futures_util::future::BoxFuture;
use std::any::{type_name, Any};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use super::error::{ContainerError, FactoryFailure};
use super::resolver::Resolver;

/// 类型擦除的服务实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 服务工厂trait
pub trait ServiceFactory: Send + Sync {
    /// 创建服务实例
    fn create(&self, resolver: Resolver) -> BoxFuture<'static, Result<Instance, FactoryFailure>>;

    /// 预先声明的依赖名称；`None` 表示工厂在运行时自行解析
    fn dependencies(&self) -> Option<&[String]> {
        None
    }

    /// 产出实例的类型名称（用于日志与诊断）
    fn service_type_name(&self) -> &'static str;
}

/// 函数式服务工厂
pub struct FnServiceFactory<F, T> {
    factory_fn: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<F, T> FnServiceFactory<F, T> {
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut, T> ServiceFactory for FnServiceFactory<F, T>
where
    F: Fn(Resolver) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FactoryFailure>> + Send + 'static,
    T: Send + Sync + 'static,
{
    fn create(&self, resolver: Resolver) -> BoxFuture<'static, Result<Instance, FactoryFailure>> {
        let fut = (self.factory_fn)(resolver);
        Box::pin(async move {
            let service = fut.await?;
            Ok::<Instance, FactoryFailure>(Arc::new(service))
        })
    }

    fn service_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// 声明式依赖注入工厂
pub struct InjectedFactory<F, T> {
    dependencies: Arc<[String]>,
    factory_fn: Arc<F>,
    _phantom: PhantomData<fn() -> T>,
}

impl<F, T> InjectedFactory<F, T> {
    pub fn new(dependencies: &[&str], factory_fn: F) -> Self {
        Self {
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            factory_fn: Arc::new(factory_fn),
            _phantom: PhantomData,
        }
    }
}

impl<F, T> ServiceFactory for InjectedFactory<F, T>
where
    F: Fn(Dependencies) -> Result<T, FactoryFailure> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn create(&self, resolver: Resolver) -> BoxFuture<'static, Result<Instance, FactoryFailure>> {
        let dependencies = Arc::clone(&self.dependencies);
        let factory_fn = Arc::clone(&self.factory_fn);
        Box::pin(async move {
            // 按声明顺序依次解析
            let mut resolved = Vec::with_capacity(dependencies.len());
            for name in dependencies.iter() {
                let instance = resolver.resolve(name).await?;
                resolved.push((name.clone(), instance));
            }
            let service = (*factory_fn)(Dependencies { resolved })?;
            Ok::<Instance, FactoryFailure>(Arc::new(service))
        })
    }

    fn dependencies(&self) -> Option<&[String]> {
        Some(&self.dependencies[..])
    }

    fn service_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// 注入给 `InjectedFactory` 的已解析依赖
pub struct Dependencies {
    resolved: Vec<(String, Instance)>,
}

impl Dependencies {
    /// 按名称取出依赖并转换为具体类型
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let instance = self
            .resolved
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| Arc::clone(instance))
            .ok_or_else(|| ContainerError::UnknownDependency(name.to_string()))?;

        downcast_instance(name, instance)
    }

    /// 按声明位置取出依赖
    pub fn at<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        match self.resolved.get(index) {
            Some((name, instance)) => downcast_instance(name, Arc::clone(instance)),
            None => Err(ContainerError::UnknownDependency(format!("#{index}"))),
        }
    }

    /// 取出未转换的实例
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.resolved.iter().find(|(n, _)| n == name).map(|(_, i)| i)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resolved.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// 安全的类型转换
pub(crate) fn downcast_instance<T: Send + Sync + 'static>(
    name: &str,
    instance: Instance,
) -> Result<Arc<T>, ContainerError> {
    instance
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(pairs: Vec<(&str, Instance)>) -> Dependencies {
        Dependencies {
            resolved: pairs.into_iter().map(|(n, i)| (n.to_string(), i)).collect(),
        }
    }

    #[test]
    fn test_dependencies_typed_access() {
        let d = deps(vec![
            ("host", Arc::new(String::from("8.8.8.8")) as Instance),
            ("port", Arc::new(6379u16) as Instance),
        ]);

        assert_eq!(d.get::<String>("host").unwrap().as_str(), "8.8.8.8");
        assert_eq!(*d.at::<u16>(1).unwrap(), 6379);
        assert_eq!(d.names().collect::<Vec<_>>(), vec!["host", "port"]);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_dependencies_type_mismatch() {
        let d = deps(vec![("port", Arc::new(6379u16) as Instance)]);

        let err = d.get::<String>("port").unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { ref name, .. } if name == "port"));
    }

    #[test]
    fn test_dependencies_undeclared_name() {
        let d = deps(vec![]);

        assert!(d.is_empty());
        assert!(matches!(
            d.get::<String>("missing"),
            Err(ContainerError::UnknownDependency(_))
        ));
        assert!(d.at::<String>(0).is_err());
    }
}
