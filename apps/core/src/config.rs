//! Engine configuration.
//!
//! All tunables are externally configurable at startup through environment
//! variables (loaded via `dotenv` in `main`). Values are validated once at
//! load time; a bad value is a configuration error, never a per-message one.

use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

use crate::error::AppError;

/// The three alignment constants and their tolerance.
///
/// The invariant `|value_a + value_b - value_c| < tolerance` is a pure
/// configuration self-check: it detects drift between independently
/// configured constants and has no per-message behavior attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct AlignmentConfig {
    pub value_a: f64,
    pub value_b: f64,
    pub value_c: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub tolerance: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            value_a: 0.4,
            value_b: 0.6,
            value_c: 1.0,
            tolerance: 1e-4,
        }
    }
}

/// Top-level configuration for the calibration engine.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    #[validate(nested)]
    pub alignment: AlignmentConfig,

    /// Maximum number of cached domain classifications.
    #[validate(range(min = 1))]
    pub cache_capacity: usize,

    /// Maximum number of per-sender preference records.
    #[validate(range(min = 1))]
    pub profile_capacity: usize,

    /// Maximum number of conversation entries retained per sender.
    #[validate(range(min = 1))]
    pub history_capacity: usize,

    /// Deadline in milliseconds imposed by the transport runner on a single
    /// message. On expiry the unmodified input text is sent instead.
    #[validate(range(min = 1))]
    pub transport_deadline_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            cache_capacity: 1000,
            profile_capacity: 500,
            history_capacity: 100,
            transport_deadline_ms: 2000,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

impl EngineConfig {
    /// Load the configuration from environment variables, falling back to
    /// defaults for anything unset, then validate it.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            alignment: AlignmentConfig {
                value_a: env_parse("ATTUNE_ALIGNMENT_A", defaults.alignment.value_a)?,
                value_b: env_parse("ATTUNE_ALIGNMENT_B", defaults.alignment.value_b)?,
                value_c: env_parse("ATTUNE_ALIGNMENT_C", defaults.alignment.value_c)?,
                tolerance: env_parse("ATTUNE_ALIGNMENT_TOLERANCE", defaults.alignment.tolerance)?,
            },
            cache_capacity: env_parse("ATTUNE_CACHE_CAPACITY", defaults.cache_capacity)?,
            profile_capacity: env_parse("ATTUNE_PROFILE_CAPACITY", defaults.profile_capacity)?,
            history_capacity: env_parse("ATTUNE_HISTORY_CAPACITY", defaults.history_capacity)?,
            transport_deadline_ms: env_parse(
                "ATTUNE_TRANSPORT_DEADLINE_MS",
                defaults.transport_deadline_ms,
            )?,
        };

        config.validate()?;
        Ok(config)
    }
}
