//! Health Stability Score engine.
//!
//! Fuses fall-risk, cardiac, sleep and behavioural signals into one 0-100
//! score judged against each patient's own adaptive baseline, with confidence,
//! trend and per-subsystem explanations.

pub mod baseline;
pub mod config;
pub mod db;
pub mod history;
pub mod models;
pub mod scoring;
pub mod service;
pub mod signals;
pub mod store;

pub use baseline::{BaselineObservations, PersonalBaseline, SubsystemBaseline};
pub use config::ScoringConfig;
pub use history::{ScoreHistory, StabilityScoreHistoryEntry};
pub use models::{StabilityInput, StabilityLevel, Subsystem};
pub use scoring::{compute_score, StabilityEngine, StabilityScoreResult, SubsystemContribution};
pub use service::{ScoringOutcome, ServiceError, StabilityService};
pub use signals::{CardiacSignal, CognitiveSignal, PhysicalSignal, SleepSignal, SubsystemSignal};
pub use store::{BaselineRepository, KeyValueStore, MemoryStore, SqliteStore, StoreError};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. Filter from `RUST_LOG`, else the configured
/// default. Safe to call more than once.
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("{} v{} starting", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
