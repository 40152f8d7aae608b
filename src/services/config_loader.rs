// CloudNav Config Loader
// Reads the application config from a JSON file at the platform config path.
// A missing file yields defaults; every field is optional in the file.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::platform;
use crate::types::config::AppConfig;
use crate::types::errors::ConfigError;

/// Trait defining the config loader interface.
pub trait ConfigLoaderTrait {
    fn load(&mut self) -> Result<AppConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn get_config(&self) -> &AppConfig;
    fn get_config_path(&self) -> &str;
}

/// Loads and persists [`AppConfig`] as pretty-printed JSON.
pub struct ConfigLoader {
    config_path: String,
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new ConfigLoader.
    ///
    /// If `path_override` is `Some`, that file is used. Otherwise
    /// `CLOUDNAV_CONFIG` is consulted, then the platform config directory
    /// with `config.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override
            .or_else(|| std::env::var(platform::CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
            .unwrap_or_else(|| {
                platform::get_config_dir()
                    .join("config.json")
                    .to_string_lossy()
                    .to_string()
            });

        Self {
            config_path,
            config: AppConfig::default(),
        }
    }

    /// Replaces the in-memory config, e.g. before `save`.
    pub fn set_config(&mut self, config: AppConfig) {
        self.config = config;
    }
}

impl ConfigLoaderTrait for ConfigLoader {
    /// Loads the config file.
    ///
    /// If the file does not exist, returns the defaults.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<AppConfig, ConfigError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!("no config at {}, using defaults", self.config_path);
            self.config = AppConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        info!("loaded config from {}", self.config_path);
        self.config = config;
        Ok(self.config.clone())
    }

    /// Writes the current config, creating parent directories as needed.
    fn save(&self) -> Result<(), ConfigError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_config(&self) -> &AppConfig {
        &self.config
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
