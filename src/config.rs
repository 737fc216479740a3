//! Application constants, storage locations and scoring knobs.
//!
//! Every default reproduces the published scoring rules. A few operational
//! values can be overridden through `HSS_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::weights::SubsystemWeights;

/// Application-level constants
pub const APP_NAME: &str = "HealthStability";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "HSS_";

const DEFAULT_LOG_FILTER: &str = "info";
const DATABASE_FILE_NAME: &str = "stability.db";

/// Get the application data directory.
/// `$HSS_DATA_DIR` when set, otherwise ~/HealthStability/.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(format!("{ENV_PREFIX}DATA_DIR")) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// SQLite file holding baselines and score history.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE_NAME)
}

/// Log filter used when `RUST_LOG` is absent.
pub fn default_log_filter() -> String {
    std::env::var(format!("{ENV_PREFIX}LOG_LEVEL"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Default weights must sum to 1.0, got {0}")]
    WeightsNotNormalized(f64),

    #[error("Weight for {0} is negative")]
    NegativeWeight(&'static str),

    #[error("Level thresholds must be descending (stable > moderate > attention)")]
    ThresholdsOutOfOrder,

    #[error("History capacity must be at least 1")]
    EmptyHistory,

    #[error("Anomaly boost must be positive, got {0}")]
    InvalidBoost(f64),
}

/// Tuning values for the fusion engine and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub default_weights: SubsystemWeights,
    /// Minimum score (0-100) for each level, evaluated top-down.
    pub stable_threshold: f64,
    pub moderate_threshold: f64,
    pub attention_threshold: f64,
    /// Subsystem stability below this marks a detractor.
    pub detractor_threshold: f64,
    /// Multiplier for a subsystem whose reading is anomalous against a reliable baseline.
    pub anomaly_weight_boost: f64,
    /// Maximum retained history entries per patient.
    pub history_capacity: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_weights: SubsystemWeights::DEFAULT,
            stable_threshold: 80.0,
            moderate_threshold: 60.0,
            attention_threshold: 40.0,
            detractor_threshold: 0.6,
            anomaly_weight_boost: 1.2,
            history_capacity: 90,
        }
    }
}

impl ScoringConfig {
    /// Defaults with `HSS_HISTORY_CAPACITY` and `HSS_ANOMALY_BOOST` applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(capacity) = env_override::<usize>("HISTORY_CAPACITY") {
            if capacity > 0 {
                config.history_capacity = capacity;
            } else {
                tracing::warn!("Ignoring zero history capacity override");
            }
        }
        if let Some(boost) = env_override::<f64>("ANOMALY_BOOST") {
            if boost > 0.0 && boost.is_finite() {
                config.anomaly_weight_boost = boost;
            } else {
                tracing::warn!(boost, "Ignoring non-positive anomaly boost override");
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (subsystem, weight) in self.default_weights.iter() {
            if weight < 0.0 {
                return Err(ConfigError::NegativeWeight(subsystem.as_str()));
            }
        }
        let total = self.default_weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(ConfigError::WeightsNotNormalized(total));
        }
        if !(self.stable_threshold > self.moderate_threshold
            && self.moderate_threshold > self.attention_threshold)
        {
            return Err(ConfigError::ThresholdsOutOfOrder);
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        if self.anomaly_weight_boost.is_nan() || self.anomaly_weight_boost <= 0.0 {
            return Err(ConfigError::InvalidBoost(self.anomaly_weight_boost));
        }
        Ok(())
    }
}

/// Parse `HSS_<key>`; unparsable values are logged and ignored.
fn env_override<T: FromStr>(key: &str) -> Option<T> {
    let name = format!("{ENV_PREFIX}{key}");
    let raw = std::env::var(&name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = %name, value = %raw, "Ignoring unparsable override");
            None
        }
    }
}
