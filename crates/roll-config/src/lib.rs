//! # roll-config
//!
//! Layered configuration loading for Rollcall using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ROLLCALL_*` prefix, `__` as separator)
//! 2. Project-level `.rollcall/config.toml`
//! 3. User-level `~/.config/rollcall/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ROLLCALL_ATTENDANCE__CODE_TTL_MINUTES` -> `attendance.code_ttl_minutes`,
//! `ROLLCALL_DATABASE__PATH` -> `database.path`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use roll_config::RollConfig;
//!
//! let config = RollConfig::load_with_dotenv().expect("config");
//! println!("codes live for {} minutes", config.attendance.code_ttl_minutes);
//! ```

mod attendance;
mod database;
mod error;
mod general;

pub use attendance::AttendanceConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config path, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".rollcall/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RollConfig {
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl RollConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed (including a
    /// negative TTL), or `ConfigError::InvalidValue` if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(PROJECT_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("ROLLCALL_").split("__"))
    }

    /// Reject values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.attendance.has_base_url() {
            let base = self.attendance.base_url.trim();
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "attendance.base_url".into(),
                    reason: format!("'{base}' must start with http:// or https://"),
                });
            }
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rollcall").join("config.toml"))
    }
}
