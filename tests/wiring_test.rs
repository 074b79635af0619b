//! 演示应用装配的集成测试

use std::fs;
use tempfile::TempDir;
use wirekit::app::{names, register_services, Application};
use wirekit::auth::{AuthController, LoginRequest};
use wirekit::config::{AppConfig, ConfigLoader};
use wirekit::errors::{AppError, AuthError};
use wirekit::infrastructure::container::GraphNode;
use wirekit::infrastructure::{ContainerError, ServiceContainer};

fn login(username: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: "password".to_string(),
    }
}

#[tokio::test]
async fn test_login_then_check_through_container() {
    let app = Application::start(AppConfig::default()).await.unwrap();
    let controller = app.controller().await.unwrap();

    let issued = controller.create_token(login("alice")).await.unwrap();
    let user = controller.check_token(&issued.token).await.unwrap();
    assert_eq!(user.username, "alice");

    let unknown = controller.check_token("not-a-token").await;
    assert!(matches!(unknown, Err(AuthError::TokenNotFound)));
}

#[tokio::test]
async fn test_controller_is_shared() {
    let app = Application::start(AppConfig::default()).await.unwrap();

    let first = app.controller().await.unwrap();
    let second = app.controller().await.unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    // 一个控制器签发的令牌可以被另一个引用校验，因为它们共享同一个存储
    let issued = first.create_token(login("bob")).await.unwrap();
    assert_eq!(second.check_token(&issued.token).await.unwrap().username, "bob");

    let stats = app.container().stats();
    assert_eq!(stats.registered, 6);
    assert_eq!(stats.resolved, 6);
    assert_eq!(stats.factory_invocations, 3);
}

#[tokio::test]
async fn test_build_is_lazy() {
    let app = Application::build(AppConfig::default()).unwrap();

    assert!(!app.container().is_resolved(names::REDIS));
    assert!(!app.container().is_resolved(names::AUTH_CONTROLLER));
    assert_eq!(app.container().stats().factory_invocations, 0);

    app.controller().await.unwrap();
    assert!(app.container().is_resolved(names::AUTH_MODEL));
}

#[tokio::test]
async fn test_initialization_order_puts_dependencies_first() {
    let app = Application::build(AppConfig::default()).unwrap();
    let order = app.container().dependency_graph().initialization_order().unwrap();

    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(position(names::REDIS) < position(names::AUTH_MODEL));
    assert!(position(names::TOKEN_SECRET) < position(names::AUTH_MODEL));
    assert_eq!(order.len(), 6);
}

#[tokio::test]
async fn test_graph_describes_bindings() {
    let app = Application::build(AppConfig::default()).unwrap();
    let graph = app.container().dependency_graph();

    assert_eq!(graph.get(names::REDIS_HOST), Some(&GraphNode::Value));
    match graph.get(names::AUTH_MODEL) {
        Some(GraphNode::Factory {
            dependencies: Some(deps),
            ..
        }) => assert_eq!(deps, &[names::REDIS, names::TOKEN_SECRET, names::TOKEN_TTL]),
        other => panic!("expected injected factory, got {other:?}"),
    }
    // 服务定位器风格的工厂在运行时才知道依赖
    assert!(matches!(
        graph.get(names::AUTH_CONTROLLER),
        Some(GraphNode::Factory { dependencies: None, .. })
    ));
    assert_eq!(graph.nodes().count(), 6);
}

#[tokio::test]
async fn test_registering_twice_is_rejected() {
    let container = ServiceContainer::new();
    let config = AppConfig::default();

    register_services(&container, &config).unwrap();
    let err = register_services(&container, &config).unwrap_err();

    assert!(matches!(err, ContainerError::DuplicateBinding(ref n) if n == names::REDIS_HOST));
}

#[tokio::test]
async fn test_store_failure_is_fatal_and_retryable() {
    let config = AppConfig {
        redis_host: String::new(),
        ..AppConfig::default()
    };
    let app = Application::build(config).unwrap();

    let err = app.controller().await.err().unwrap();
    match err {
        AppError::Container(inner) => {
            assert!(inner.is_retryable());
            assert!(matches!(inner, ContainerError::FactoryFailed { ref name, .. } if name == names::REDIS));
        }
        other => panic!("expected wiring error, got {other:?}"),
    }
    assert!(!app.container().is_resolved(names::REDIS));
}

#[tokio::test]
async fn test_start_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wirekit.toml");
    fs::write(
        &path,
        r#"
redis_host = "10.0.0.5"
token_secret = "file-secret"
token_ttl_secs = 120

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new().load_config_file(&path).unwrap();
    assert_eq!(config.token_ttl_secs, 120);

    let app = Application::start(config).await.unwrap();
    let host = app
        .container()
        .resolve_as::<String>(names::REDIS_HOST)
        .await
        .unwrap();
    assert_eq!(host.as_str(), "10.0.0.5");

    let controller = app
        .container()
        .resolve_as::<AuthController>(names::AUTH_CONTROLLER)
        .await
        .unwrap();
    let issued = controller.create_token(login("carol")).await.unwrap();
    assert_eq!(issued.expires_in_secs, 120);
}
