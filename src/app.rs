// 演示应用的依赖装配

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthController, AuthModel};
use crate::clients::{KeyValueStore, MemoryStore};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::infrastructure::{ContainerError, FactoryFailure, Resolver, ServiceContainer};
use crate::logging::OperationTimer;

/// 绑定名称
pub mod names {
    pub const REDIS_HOST: &str = "redisHost";
    pub const TOKEN_SECRET: &str = "tokenSecret";
    pub const TOKEN_TTL: &str = "tokenTtl";
    pub const REDIS: &str = "redis";
    pub const AUTH_MODEL: &str = "authModel";
    pub const AUTH_CONTROLLER: &str = "authController";
}

/// 把配置与各组件注册进容器
///
/// `redis` 与 `authController` 以服务定位器方式在工厂内部解析依赖；
/// `authModel` 声明依赖名称，由容器注入。
pub fn register_services(container: &ServiceContainer, config: &AppConfig) -> Result<(), ContainerError> {
    container.register_value(names::REDIS_HOST, config.redis_host.clone())?;
    container.register_value(names::TOKEN_SECRET, config.token_secret.clone())?;
    container.register_value(names::TOKEN_TTL, Duration::from_secs(config.token_ttl_secs))?;

    container.register_factory(names::REDIS, |r: Resolver| async move {
        let host = r.resolve_as::<String>(names::REDIS_HOST).await?;
        let store = MemoryStore::connect(&host).await?;
        Ok::<_, FactoryFailure>(Arc::new(store) as Arc<dyn KeyValueStore>)
    })?;

    container.register_injected(
        names::AUTH_MODEL,
        &[names::REDIS, names::TOKEN_SECRET, names::TOKEN_TTL],
        |deps| {
            let store = deps.get::<Arc<dyn KeyValueStore>>(names::REDIS)?;
            let secret = deps.get::<String>(names::TOKEN_SECRET)?;
            let ttl = deps.get::<Duration>(names::TOKEN_TTL)?;
            Ok(AuthModel::new(Arc::clone(&*store), secret, *ttl))
        },
    )?;

    container.register_factory(names::AUTH_CONTROLLER, |r: Resolver| async move {
        let model = r.resolve_as::<AuthModel>(names::AUTH_MODEL).await?;
        Ok::<_, FactoryFailure>(AuthController::new(model))
    })?;

    tracing::info!(bindings = container.len(), "Services registered");
    Ok(())
}

/// 装配完成的应用
pub struct Application {
    container: ServiceContainer,
    config: AppConfig,
}

impl Application {
    /// 注册全部服务并做静态检查，不执行任何工厂
    pub fn build(config: AppConfig) -> Result<Self, AppError> {
        let container = ServiceContainer::new();
        register_services(&container, &config)?;
        container.validate()?;
        Ok(Self { container, config })
    }

    /// 启动时一次性解析全部绑定，任何失败都应终止进程
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let app = Self::build(config)?;
        let timer = OperationTimer::new("container_warm_up");
        app.container.warm_up().await?;
        timer.finish();
        Ok(app)
    }

    pub async fn controller(&self) -> Result<Arc<AuthController>, AppError> {
        Ok(self
            .container
            .resolve_as::<AuthController>(names::AUTH_CONTROLLER)
            .await?)
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LoginRequest;

    #[tokio::test]
    async fn test_wiring_resolves_controller() {
        let app = Application::start(AppConfig::default()).await.unwrap();

        let controller = app.controller().await.unwrap();
        let issued = controller
            .create_token(LoginRequest {
                username: "alice".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        let user = controller.check_token(&issued.token).await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(issued.expires_in_secs, 3600);
    }

    #[tokio::test]
    async fn test_bad_host_fails_at_startup() {
        let config = AppConfig {
            redis_host: " ".to_string(),
            ..AppConfig::default()
        };

        let err = Application::start(config).await.err().unwrap();
        assert!(matches!(
            err,
            AppError::Container(ContainerError::FactoryFailed { ref name, .. }) if name == names::REDIS
        ));
    }
}
