use std::env;
use std::fmt;
use std::time::Duration as StdDuration;

use chrono::Duration;

/// Runtime knobs for the rating subsystem. Scoring thresholds and rule
/// weights are static tables (`rating::tables`), not configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub cache: CacheConfig,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let log_level = env::var("FOOD_INSIGHT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cache = CacheConfig {
            capacity: read_usize("FOOD_INSIGHT_CACHE_CAPACITY", 5_000)?,
            rating_ttl: Duration::hours(read_i64("FOOD_INSIGHT_RATING_TTL_HOURS", 24)?),
            sweep_interval: StdDuration::from_secs(
                read_u64("FOOD_INSIGHT_SWEEP_INTERVAL_MINUTES", 60)? * 60,
            ),
        };

        let scheduler = SchedulerConfig {
            batch_size: read_usize("FOOD_INSIGHT_BATCH_SIZE", 50)?,
            run_interval: StdDuration::from_secs(
                read_u64("FOOD_INSIGHT_BATCH_INTERVAL_HOURS", 6)? * 3_600,
            ),
            stale_after: Duration::hours(read_i64("FOOD_INSIGHT_STALE_AFTER_HOURS", 24)?),
            neutral_recheck_after: Duration::hours(read_i64(
                "FOOD_INSIGHT_NEUTRAL_RECHECK_HOURS",
                12,
            )?),
            significant_delta: 0.5,
        };

        Ok(Self {
            telemetry: TelemetryConfig { log_level },
            cache,
            scheduler,
        })
    }
}

/// Tracing controls for the worker binary.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Sizing and lifetime settings for the rating cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub capacity: usize,
    pub rating_ttl: Duration,
    pub sweep_interval: StdDuration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 5_000,
            rating_ttl: Duration::hours(24),
            sweep_interval: StdDuration::from_secs(3_600),
        }
    }
}

/// Cadence and staleness thresholds for the batch refresh job.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub run_interval: StdDuration,
    /// Any rating older than this is due for recomputation.
    pub stale_after: Duration,
    /// Unrated or neutral-default records are re-checked on this shorter window.
    pub neutral_recheck_after: Duration,
    /// Minimum score delta that counts as a significant change.
    pub significant_delta: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            run_interval: StdDuration::from_secs(6 * 3_600),
            stale_after: Duration::hours(24),
            neutral_recheck_after: Duration::hours(12),
            significant_delta: 0.5,
        }
    }
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn read_i64(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    read_u64(key, default as u64).map(|value| value as i64)
}

fn read_usize(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    read_u64(key, default as u64).map(|value| value as usize)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("FOOD_INSIGHT_LOG_LEVEL");
        env::remove_var("FOOD_INSIGHT_CACHE_CAPACITY");
        env::remove_var("FOOD_INSIGHT_RATING_TTL_HOURS");
        env::remove_var("FOOD_INSIGHT_SWEEP_INTERVAL_MINUTES");
        env::remove_var("FOOD_INSIGHT_BATCH_SIZE");
        env::remove_var("FOOD_INSIGHT_BATCH_INTERVAL_HOURS");
        env::remove_var("FOOD_INSIGHT_STALE_AFTER_HOURS");
        env::remove_var("FOOD_INSIGHT_NEUTRAL_RECHECK_HOURS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.cache.capacity, 5_000);
        assert_eq!(config.cache.rating_ttl, Duration::hours(24));
        assert_eq!(config.scheduler.batch_size, 50);
        assert_eq!(config.scheduler.run_interval, StdDuration::from_secs(21_600));
    }

    #[test]
    fn rejects_non_numeric_batch_size() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FOOD_INSIGHT_BATCH_SIZE", "plenty");
        let err = AppConfig::load().expect_err("non-numeric batch size rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "FOOD_INSIGHT_BATCH_SIZE"
            }
        ));
        env::remove_var("FOOD_INSIGHT_BATCH_SIZE");
    }

    #[test]
    fn honors_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FOOD_INSIGHT_CACHE_CAPACITY", "100");
        env::set_var("FOOD_INSIGHT_BATCH_INTERVAL_HOURS", "1");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.scheduler.run_interval, StdDuration::from_secs(3_600));
        reset_env();
    }
}
