use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

use super::loader::ConfigLoader;
use crate::errors::ConfigError;
use crate::logging::LoggingConfig;

// Configuration location constants
pub const USER_CONFIG_DIR: &str = "wirekit";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Template shipped with the binary, written out on first run
pub const TEMPLATE_CONFIG: &str = include_str!("../../assets/config.example.toml");

// Environment overrides
pub const ENV_REDIS_HOST: &str = "WIREKIT_REDIS_HOST";
pub const ENV_TOKEN_SECRET: &str = "WIREKIT_TOKEN_SECRET";
pub const ENV_TOKEN_TTL: &str = "WIREKIT_TOKEN_TTL_SECS";

const DEFAULT_REDIS_HOST: &str = "8.8.8.8";
const DEFAULT_TOKEN_SECRET: &str = "SECRET:KEY!";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Main Application Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub redis_host: String,
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub logging: LoggingSettings,
}

/// Logging section as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl LoggingSettings {
    pub fn to_logging_config(&self) -> Result<LoggingConfig, ConfigError> {
        LoggingConfig::from_strings(&self.level, &self.format)
    }
}

/// Partial configuration as deserialized from the TOML file
#[derive(Debug, Default, Deserialize)]
pub struct PartialAppConfig {
    pub redis_host: Option<String>,
    pub token_secret: Option<String>,
    pub token_ttl_secs: Option<u64>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_host: DEFAULT_REDIS_HOST.to_string(),
            token_secret: DEFAULT_TOKEN_SECRET.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location and environment
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load_config()
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        ConfigLoader::new().load_config_file(path)
    }

    /// Create AppConfig from partial config and environment
    pub fn from_partial_and_env(
        partial: Option<PartialAppConfig>,
        env_map: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();
        let defaults = AppConfig::default();

        let redis_host = env_map
            .get(ENV_REDIS_HOST)
            .cloned()
            .or(partial.redis_host)
            .unwrap_or(defaults.redis_host);

        let token_secret = env_map
            .get(ENV_TOKEN_SECRET)
            .cloned()
            .or(partial.token_secret)
            .unwrap_or(defaults.token_secret);

        let token_ttl_secs = match env_map.get(ENV_TOKEN_TTL) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::FieldMissing(ENV_TOKEN_TTL.to_string()))?,
            None => partial.token_ttl_secs.unwrap_or(defaults.token_ttl_secs),
        };

        let logging = match partial.logging {
            Some(section) => LoggingSettings {
                level: section.level.unwrap_or(defaults.logging.level),
                format: section.format.unwrap_or(defaults.logging.format),
            },
            None => defaults.logging,
        };

        let config = AppConfig {
            redis_host,
            token_secret,
            token_ttl_secs,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis_host.trim().is_empty() {
            return Err(ConfigError::FieldMissing("redis_host".to_string()));
        }
        if self.token_secret.is_empty() {
            return Err(ConfigError::FieldMissing("token_secret".to_string()));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::FieldMissing("token_ttl_secs".to_string()));
        }
        self.logging.to_logging_config()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_template() {
        let parsed: PartialAppConfig = toml::from_str(TEMPLATE_CONFIG).unwrap();
        let config = AppConfig::from_partial_and_env(Some(parsed), HashMap::new()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let partial = PartialAppConfig {
            redis_host: Some("10.0.0.1".to_string()),
            ..Default::default()
        };
        let mut env_map = HashMap::new();
        env_map.insert(ENV_REDIS_HOST.to_string(), "redis.internal".to_string());
        env_map.insert(ENV_TOKEN_TTL.to_string(), "60".to_string());

        let config = AppConfig::from_partial_and_env(Some(partial), env_map).unwrap();
        assert_eq!(config.redis_host, "redis.internal");
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(config.token_secret, DEFAULT_TOKEN_SECRET);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let partial = PartialAppConfig {
            token_secret: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            AppConfig::from_partial_and_env(Some(partial), HashMap::new()),
            Err(ConfigError::FieldMissing(ref f)) if f == "token_secret"
        ));

        let mut env_map = HashMap::new();
        env_map.insert(ENV_TOKEN_TTL.to_string(), "soon".to_string());
        assert!(AppConfig::from_partial_and_env(None, env_map).is_err());

        let partial = PartialAppConfig {
            logging: Some(PartialLoggingSettings {
                level: Some("chatty".to_string()),
                format: None,
            }),
            ..Default::default()
        };
        assert!(matches!(
            AppConfig::from_partial_and_env(Some(partial), HashMap::new()),
            Err(ConfigError::InvalidLogging(_))
        ));
    }
}
