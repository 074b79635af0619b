use std::{collections::HashMap, env, fs, path::Path, path::PathBuf};

use super::app_config::{
    AppConfig, PartialAppConfig, CONFIG_FILE_NAME, ENV_REDIS_HOST, ENV_TOKEN_SECRET, ENV_TOKEN_TTL,
    TEMPLATE_CONFIG, USER_CONFIG_DIR,
};
use crate::errors::ConfigError;

/// Configuration loader responsible for loading config from files and environment
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default paths
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Create a config loader with custom base path (for testing)
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
        }
    }

    /// Load configuration from the default location, creating it from the template if missing
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let config_path = self.config_path()?;
        self.initialize_config_file(&config_path)?;
        self.load_config_file(&config_path)
    }

    /// Load configuration from an explicit file; the file must exist
    pub fn load_config_file(&self, path: &Path) -> Result<AppConfig, ConfigError> {
        let partial = self.load_partial_config(path)?;
        let env_map = self.collect_env_vars();
        AppConfig::from_partial_and_env(Some(partial), env_map)
    }

    /// Resolve the config file path
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        let base = match &self.base_path {
            Some(base_path) => base_path.clone(),
            None => dirs::config_dir()
                .ok_or_else(|| ConfigError::Other("Cannot determine config directory".to_string()))?,
        };
        Ok(base.join(USER_CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    fn load_partial_config(&self, path: &Path) -> Result<PartialAppConfig, ConfigError> {
        let display = path.to_string_lossy().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display, e))
    }

    /// Write the template config if no file exists yet
    fn initialize_config_file(&self, target_path: &Path) -> Result<(), ConfigError> {
        if target_path.exists() {
            return Ok(());
        }

        if let Some(config_dir) = target_path.parent() {
            fs::create_dir_all(config_dir).map_err(|e| {
                ConfigError::FileWrite(config_dir.to_string_lossy().to_string(), e)
            })?;
        }
        fs::write(target_path, TEMPLATE_CONFIG).map_err(|e| {
            ConfigError::FileWrite(target_path.to_string_lossy().to_string(), e)
        })?;

        tracing::info!(path = ?target_path, "Initialized default configuration file");
        Ok(())
    }

    /// Collect the environment variables the config understands
    fn collect_env_vars(&self) -> HashMap<String, String> {
        [ENV_REDIS_HOST, ENV_TOKEN_SECRET, ENV_TOKEN_TTL]
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
