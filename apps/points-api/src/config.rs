//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use points_db::DbConfig;
use points_service::RateLimitConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Redis connection string (in-memory cache when absent)
    pub redis_url: Option<String>,

    /// Rate limiter on/off
    pub limiter_enabled: bool,

    /// Sustained requests per second per client
    pub limiter_rps: f64,

    /// Burst size per client
    pub limiter_burst: u32,

    /// Seconds between store stats collections
    pub stats_interval_secs: u64,

    /// Per-request deadline in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_path: "./data/receipts.db".to_string(),
            redis_url: None,
            limiter_enabled: true,
            limiter_rps: 2.0,
            limiter_burst: 4,
            stats_interval_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            port: parse_var("PORT", defaults.port)?,
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            limiter_enabled: parse_var("LIMITER_ENABLED", defaults.limiter_enabled)?,
            limiter_rps: parse_var("LIMITER_RPS", defaults.limiter_rps)?,
            limiter_burst: parse_var("LIMITER_BURST", defaults.limiter_burst)?,
            stats_interval_secs: parse_var("STATS_INTERVAL_SECS", defaults.stats_interval_secs)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limiter_enabled {
            if !(self.limiter_rps.is_finite() && self.limiter_rps > 0.0) {
                return Err(ConfigError::InvalidValue("LIMITER_RPS".to_string()));
            }
            if self.limiter_burst == 0 {
                return Err(ConfigError::InvalidValue("LIMITER_BURST".to_string()));
            }
        }
        if self.stats_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("STATS_INTERVAL_SECS".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string()));
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            enabled: self.limiter_enabled,
            requests_per_second: self.limiter_rps,
            burst: self.limiter_burst,
            ..Default::default()
        }
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
