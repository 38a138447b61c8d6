//! Tool configuration module
//!
//! Loads settings from `.env`, an optional `falcon.toml` and `FALCON_*`
//! environment variables, in increasing order of precedence.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name of the optional project configuration file (`falcon.toml`)
pub const CONFIG_FILE_NAME: &str = "falcon";

/// Prefix for environment overrides, e.g. `FALCON_MIGRATIONS_DIR`
pub const ENV_PREFIX: &str = "FALCON";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration sources: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Complete tool settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Where generated migration files are written
    pub migrations_dir: PathBuf,
    /// Where Sequelize model JSON files live
    pub models_dir: PathBuf,
    /// Fallback tracing filter when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("migrations"),
            models_dir: PathBuf::from("models/sequelize"),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the working directory and environment
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Load settings using `config_file` (extension optional) as the file source
    pub fn load_from(config_file: &Path) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let file_name = config_file.to_str().ok_or_else(|| {
            ConfigError::InvalidValue(format!("Non UTF-8 config path: {}", config_file.display()))
        })?;

        let settings: Settings = config::Config::builder()
            .set_default("migrations_dir", defaults.migrations_dir.to_string_lossy().as_ref())?
            .set_default("models_dir", defaults.models_dir.to_string_lossy().as_ref())?
            .set_default("log_filter", defaults.log_filter)?
            .add_source(config::File::with_name(file_name).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.migrations_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("migrations_dir must not be empty".to_string()));
        }
        if self.models_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("models_dir must not be empty".to_string()));
        }
        Ok(())
    }
}
