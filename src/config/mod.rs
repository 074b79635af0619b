pub mod app_config;
pub mod loader;

// Re-export commonly used types
pub use app_config::{AppConfig, LoggingSettings, PartialAppConfig};
pub use loader::ConfigLoader;

// Re-export constants
pub use app_config::{CONFIG_FILE_NAME, ENV_REDIS_HOST, ENV_TOKEN_SECRET, ENV_TOKEN_TTL};
