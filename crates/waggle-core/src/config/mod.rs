//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `WAGGLE_CONFIG` env var
//! 3. **Environment variables**: `WAGGLE__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, concurrency)
//! - [`ChecksConfig`]: sweep cadence and per-checker thresholds
//! - [`RetentionConfig`]: resolved-alert garbage collection
//! - [`ScoringWeights`]: weights of the hive health scoring engine
//! - [`MetricsConfig`]: Prometheus metrics endpoint
//! - [`LoggingConfig`]: log level and format
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (zero
//! intervals, unordered severity breakpoints, inverted score thresholds)
//! return errors rather than failing silently at sweep time.
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! bind_port = 7070
//!
//! [checks]
//! sweep_interval_seconds = 86400
//!
//! [checks.overdue]
//! medium_ratio = 2.0
//! high_ratio = 4.0
//!
//! [retention]
//! resolved_days = 30
//! ```

use crate::{
    checkers::{HealthScoreConfig, OverdueConfig},
    scoring::ScoringWeights,
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `7070`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of concurrent requests. Defaults to `100`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    7070
}

fn default_max_concurrent_requests() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 7070,
            max_concurrent_requests: 100,
        }
    }
}

/// Sweep cadence and per-checker thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Seconds between full sweeps across all active hives. Defaults to one
    /// day.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Severity breakpoints for the inspection overdue checker.
    #[serde(default)]
    pub overdue: OverdueConfig,

    /// Thresholds for the health score checker.
    #[serde(default)]
    pub health: HealthScoreConfig,
}

fn default_sweep_interval_seconds() -> u64 {
    86_400
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: 86_400,
            overdue: OverdueConfig::default(),
            health: HealthScoreConfig::default(),
        }
    }
}

/// Resolved-alert garbage collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Resolved alerts older than this many days are deleted. Defaults to
    /// `30`.
    #[serde(default = "default_resolved_days")]
    pub resolved_days: u32,

    /// Seconds between purge runs. Defaults to one day.
    #[serde(default = "default_purge_interval_seconds")]
    pub purge_interval_seconds: u64,
}

fn default_resolved_days() -> u32 {
    30
}

fn default_purge_interval_seconds() -> u64 {
    86_400
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { resolved_days: 30, purge_interval_seconds: 86_400 }
    }
}

/// Prometheus metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether the metrics recorder is installed and `/metrics` serves
    /// Prometheus exposition. Defaults to `true`.
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error").
    /// Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Root application configuration containing all subsystem settings.
///
/// Loaded from TOML with `WAGGLE__` environment overrides using `__` as the
/// separator (e.g. `WAGGLE__SERVER__BIND_PORT=8080`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Sweep cadence and checker thresholds.
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Resolved-alert retention.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Hive health scoring weights.
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Prometheus metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            checks: ChecksConfig::default(),
            retention: RetentionConfig::default(),
            scoring: ScoringWeights::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 7070)?
            .set_default("server.max_concurrent_requests", 100)?
            .set_default("checks.sweep_interval_seconds", 86_400)?
            .set_default("retention.resolved_days", 30)?
            .set_default("retention.purge_interval_seconds", 86_400)?
            .set_default("metrics.enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("WAGGLE").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to
    /// defaults. The path can be overridden with the `WAGGLE_CONFIG`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("WAGGLE_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    /// Returns the sweep interval as a [`Duration`].
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.checks.sweep_interval_seconds)
    }

    /// Returns the retention purge interval as a [`Duration`].
    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.retention.purge_interval_seconds)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.checks.sweep_interval_seconds == 0 {
            return Err("Sweep interval must be greater than 0".to_string());
        }

        if self.retention.resolved_days == 0 {
            return Err("Resolved alert retention must be at least one day".to_string());
        }

        if self.retention.purge_interval_seconds == 0 {
            return Err("Purge interval must be greater than 0".to_string());
        }

        let overdue = &self.checks.overdue;
        if overdue.medium_ratio <= 1.0 {
            return Err("Overdue medium breakpoint must be above 1.0".to_string());
        }
        if overdue.medium_ratio >= overdue.high_ratio ||
            overdue.high_ratio >= overdue.critical_ratio
        {
            return Err(
                "Overdue breakpoints must be ordered: medium < high < critical".to_string()
            );
        }

        let health = &self.checks.health;
        if health.critical_below >= health.warn_below {
            return Err("Health critical threshold must be below the warn threshold".to_string());
        }

        let w = &self.scoring;
        let weights = [
            w.strength,
            w.brood,
            w.honey,
            w.pollen,
            w.queen_cells,
            w.queen_brood,
            w.queen_flag,
            w.overall_population,
            w.overall_stores,
            w.overall_queen,
        ];
        if weights.iter().any(|weight| !weight.is_finite() || *weight <= 0.0) {
            return Err("Scoring weights must be positive and finite".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
