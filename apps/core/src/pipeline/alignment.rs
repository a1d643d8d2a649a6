//! Alignment validation.
//!
//! A configuration self-check over the three alignment constants:
//! `|A + B - C| < tolerance`. It runs at engine construction and on explicit
//! reconfiguration, never per message. A violation means configuration drift,
//! not a safety problem: the engine logs it and keeps operating on
//! last-known-good defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AlignmentConfig;

/// Outcome of an alignment check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub valid: bool,
    /// The measured drift `|A + B - C|`.
    pub drift: f64,
    pub tolerance: f64,
}

/// Validate an alignment configuration.
///
/// On violation a warning is emitted and the report flags the drift; callers
/// are expected to fall back to [`AlignmentConfig::default`] and set their
/// degraded flag rather than abort.
pub fn validate(config: &AlignmentConfig) -> AlignmentReport {
    let drift = (config.value_a + config.value_b - config.value_c).abs();
    let valid = drift < config.tolerance;

    if !valid {
        warn!(
            drift,
            tolerance = config.tolerance,
            "alignment invariant violated; continuing with last-known-good defaults"
        );
    }

    AlignmentReport {
        valid,
        drift,
        tolerance: config.tolerance,
    }
}
