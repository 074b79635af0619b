use thiserror::Error;

use crate::infrastructure::ContainerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Wiring error: {0}")]
    Container(#[from] ContainerError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to write to path '{0}': {1}")]
    FileWrite(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Required configuration field '{0}' is missing or invalid")]
    FieldMissing(String),
    #[error("Unsupported log level or format: {0}")]
    InvalidLogging(String),
    #[error("Other Config Error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password must not be empty")]
    InvalidCredentials,
    #[error("Token not found")]
    TokenNotFound,
    #[error("Token store failure: {0}")]
    Store(String),
}
