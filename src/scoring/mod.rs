//! Fusion engine: adaptive weights, composite score, confidence, trend and
//! per-subsystem explanations.

pub mod confidence;
pub mod engine;
pub mod insights;
pub mod messages;
pub mod trend;
pub mod types;
pub mod weights;

pub use engine::{compute_score, StabilityEngine};
pub use insights::Finding;
pub use trend::TrendDirection;
pub use types::{StabilityScoreResult, SubsystemContribution};
pub use weights::SubsystemWeights;
