pub mod app;
pub mod args;
pub mod auth;
pub mod clients;
pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use errors::AppError;
pub use infrastructure::{ContainerError, ContainerStats, Resolver, ServiceContainer};
