//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Statistics API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_endpoint_path")]
    pub accidents_path: String,

    /// Currently the same endpoint as `accidents_path`
    #[serde(default = "default_endpoint_path")]
    pub deaths_path: String,

    /// Period label used in cache keys
    #[serde(default = "default_period")]
    pub period: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_endpoint_path() -> String {
    "/api/accidents_by_month".to_string()
}

fn default_period() -> String {
    "2023".to_string()
}

fn default_request_timeout() -> u64 {
    10_000 // 10 seconds
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            accidents_path: default_endpoint_path(),
            deaths_path: default_endpoint_path(),
            period: default_period(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl SourceConfig {
    pub fn accidents_url(&self) -> String {
        join_url(&self.base_url, &self.accidents_path)
    }

    pub fn deaths_url(&self) -> String {
        join_url(&self.base_url, &self.deaths_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Chart rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub y_min: f64,

    #[serde(default = "default_y_max")]
    pub y_max: f64,

    /// Fill/line color per series
    #[serde(default = "default_colors")]
    pub colors: [String; 2],

    #[serde(default = "default_marker_stroke_colors")]
    pub marker_stroke_colors: [String; 2],

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,

    #[serde(default = "default_marker_size")]
    pub marker_size: u32,
}

fn default_y_max() -> f64 {
    2650.0
}

fn default_colors() -> [String; 2] {
    ["#3C50E0".to_string(), "#80CAEE".to_string()]
}

fn default_marker_stroke_colors() -> [String; 2] {
    ["#3056D3".to_string(), "#80CAEE".to_string()]
}

fn default_height() -> u32 {
    350
}

fn default_stroke_width() -> u32 {
    2
}

fn default_marker_size() -> u32 {
    4
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            y_min: 0.0,
            y_max: default_y_max(),
            colors: default_colors(),
            marker_stroke_colors: default_marker_stroke_colors(),
            height: default_height(),
            stroke_width: default_stroke_width(),
            marker_size: default_marker_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

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
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.apply_overrides(var);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// First existing config file among the default locations
    pub fn default_path() -> Option<PathBuf> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("accident-trends").join("config.toml")),
            Some(PathBuf::from("/etc/accident-trends/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        config_paths.into_iter().flatten().find(|path| path.exists())
    }

    /// Load from the first default location, or from the environment alone
    ///
    /// A config file that exists but fails to load is an error rather than
    /// being skipped in favor of defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_with_env(&path),
            None => Self::from_env(),
        }
    }

    /// Reject settings the renderer or fetcher cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (y_min, y_max) = (self.chart.y_min, self.chart.y_max);
        if !y_min.is_finite() || !y_max.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "chart bounds must be finite, got y_min = {} and y_max = {}",
                y_min, y_max
            )));
        }
        if y_min >= y_max {
            return Err(ConfigError::Invalid(format!(
                "chart.y_min ({}) must be below chart.y_max ({})",
                self.chart.y_min, self.chart.y_max
            )));
        }
        if self.source.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "source.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Source overrides
        if let Some(url) = var("ACCIDENT_TRENDS_BASE_URL") {
            self.source.base_url = url;
        }
        if let Some(period) = var("ACCIDENT_TRENDS_PERIOD") {
            self.source.period = period;
        }
        if let Some(timeout) = var("ACCIDENT_TRENDS_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.source.request_timeout_ms = ms;
            }
        }

        // Chart overrides
        if let Some(y_max) = var("ACCIDENT_TRENDS_Y_MAX") {
            if let Ok(v) = y_max.parse() {
                self.chart.y_max = v;
            }
        }

        // Logging overrides
        if let Some(level) = var("ACCIDENT_TRENDS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ACCIDENT_TRENDS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# Accident Trends Configuration
#
# Environment variables override these settings:
# - ACCIDENT_TRENDS_BASE_URL
# - ACCIDENT_TRENDS_PERIOD
# - ACCIDENT_TRENDS_TIMEOUT_MS
# - ACCIDENT_TRENDS_Y_MAX
# - ACCIDENT_TRENDS_LOG_LEVEL
# - ACCIDENT_TRENDS_LOG_FORMAT

[source]
# Statistics API base URL
base_url = "http://127.0.0.1:8000"

# Endpoint paths for the two monthly queries
accidents_path = "/api/accidents_by_month"
deaths_path = "/api/accidents_by_month"

# Period label used in cache keys
period = "2023"

# Request timeout in milliseconds
request_timeout_ms = 10000

[chart]
# Y-axis bounds
y_min = 0
y_max = 2650

# Series colors (accidents, deaths)
colors = ["#3C50E0", "#80CAEE"]
marker_stroke_colors = ["#3056D3", "#80CAEE"]

# Chart height in pixels
height = 350

stroke_width = 2
marker_size = 4

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"##
    .to_string()
}
