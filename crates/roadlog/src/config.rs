//! Configuration management for roadlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "roadlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "roadlog.db";

/// Directory the game plugin writes its snapshot into, under the user's
/// document directory.
const TELEMETRY_DIR_NAME: &str = "ETS2_Tracker";

/// File name the game plugin writes.
const TELEMETRY_FILE_NAME: &str = "tracker_data.json";

/// Distance goal assumed for drivers that never set one, in kilometers.
pub const DEFAULT_GOAL_KM: i64 = 10_000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROADLOG_`)
/// 2. TOML config file at `~/.config/roadlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Telemetry ingestion configuration.
    pub telemetry: TelemetryConfig,
    /// Statistics configuration.
    pub stats: StatsConfig,
    /// Admin account configuration.
    pub admin: AdminConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/roadlog/roadlog.db`
    pub database_path: Option<PathBuf>,
}

/// Telemetry-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Path to the snapshot file written by the game plugin.
    /// Defaults to `<documents>/ETS2_Tracker/tracker_data.json`
    pub file_path: Option<PathBuf>,
    /// Interval between snapshot polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum seconds between two recorded trips (debounce).
    pub trip_cooldown_secs: u64,
    /// Trips at or below this distance are not recorded, in kilometers.
    pub min_trip_km: f64,
}

/// Statistics-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Distance goal used for drivers without an explicit one, in kilometers.
    pub default_goal_km: i64,
}

/// Admin-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Email of the account allowed to run admin commands.
    /// With no admin configured, admin commands are refused.
    pub email: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            file_path: None, // Resolved to the plugin's path at runtime
            poll_interval_ms: 1_000,
            trip_cooldown_secs: 5,
            min_trip_km: 1.0,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            default_goal_km: DEFAULT_GOAL_KM,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `ROADLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("ROADLOG_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.telemetry.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.telemetry.min_trip_km < 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_trip_km must not be negative, got {}",
                    self.telemetry.min_trip_km
                ),
            });
        }

        if self.stats.default_goal_km <= 0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "default_goal_km must be positive, got {}",
                    self.stats.default_goal_km
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the telemetry snapshot path, resolving defaults if not set.
    ///
    /// The default matches where the game plugin writes: the
    /// `ETS2_Tracker` directory under the user's documents.
    #[must_use]
    pub fn telemetry_path(&self) -> PathBuf {
        self.telemetry.file_path.clone().unwrap_or_else(|| {
            dirs::document_dir()
                .unwrap_or_else(|| PathBuf::from("Documents"))
                .join(TELEMETRY_DIR_NAME)
                .join(TELEMETRY_FILE_NAME)
        })
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry.poll_interval_ms)
    }

    /// Get the trip debounce window as a chrono Duration.
    #[must_use]
    pub fn trip_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.telemetry.trip_cooldown_secs).unwrap_or(5))
    }
}
