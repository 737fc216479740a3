//! Subsystem signal value types.
//!
//! Each collector (fall detection, cardiac rhythm, sleep sessions, mood and
//! medication check-ins) hands the engine one of these values. A signal either
//! carries a reading or is explicitly empty; an empty signal is never a reading
//! of zero. The stability formulas are pure and independent of the fusion step.

pub mod cardiac;
pub mod cognitive;
pub mod physical;
pub mod sleep;

pub use cardiac::CardiacSignal;
pub use cognitive::CognitiveSignal;
pub use physical::PhysicalSignal;
pub use sleep::SleepSignal;

use chrono::{DateTime, Utc};

use crate::models::enums::Subsystem;

/// Stability reported by an empty signal. Keeps absent data from reading as 0.
pub const NEUTRAL_STABILITY: f64 = 0.5;

/// Common view over the four signal types.
pub trait SubsystemSignal {
    const SUBSYSTEM: Subsystem;

    fn has_data(&self) -> bool;

    /// When the collector took the reading. `None` for empty signals.
    fn measured_at(&self) -> Option<DateTime<Utc>>;

    /// Subsystem-specific stability in [0, 1].
    fn stability_score(&self) -> f64;

    /// Stability when the signal carries data, `None` otherwise.
    fn observed_stability(&self) -> Option<f64> {
        if self.has_data() {
            Some(self.stability_score())
        } else {
            None
        }
    }
}

/// Clamp into [0, 1], mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_unit_bounds() {
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn observed_stability_absent_for_empty_signals() {
        assert!(PhysicalSignal::empty().observed_stability().is_none());
        assert!(CardiacSignal::empty().observed_stability().is_none());
        assert!(SleepSignal::empty().observed_stability().is_none());
        assert!(CognitiveSignal::empty().observed_stability().is_none());
    }

    #[test]
    fn empty_signals_report_neutral_stability() {
        assert_eq!(PhysicalSignal::empty().stability_score(), NEUTRAL_STABILITY);
        assert_eq!(SleepSignal::empty().stability_score(), NEUTRAL_STABILITY);
        assert_eq!(CognitiveSignal::empty().stability_score(), NEUTRAL_STABILITY);
    }
}
