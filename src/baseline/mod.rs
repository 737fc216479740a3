//! Adaptive per-patient baselines.
//!
//! Readings are judged against the patient's own history instead of population
//! thresholds. Every update returns a new value; nothing is mutated in place.

pub mod personal;
pub mod subsystem;

pub use personal::{BaselineObservations, PersonalBaseline};
pub use subsystem::SubsystemBaseline;
