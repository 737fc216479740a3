use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::Subsystem;

use super::{clamp_unit, SubsystemSignal, NEUTRAL_STABILITY};

/// Event count at which the event term saturates.
const HIGH_RISK_EVENT_SATURATION: f64 = 10.0;

/// Fall-risk reading from the fall-detection feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSignal {
    /// Latest fall probability from the detection model (0-1).
    pub current_fall_probability: f64,
    /// Mean fall probability over the trailing 24 hours (0-1).
    pub average_24h_fall_probability: f64,
    /// High-risk events (near misses, impacts) in the trailing 24 hours.
    pub high_risk_event_count: u32,
    pub has_data: bool,
    pub measured_at: Option<DateTime<Utc>>,
}

impl PhysicalSignal {
    pub fn new(
        current_fall_probability: f64,
        average_24h_fall_probability: f64,
        high_risk_event_count: u32,
        measured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            current_fall_probability,
            average_24h_fall_probability,
            high_risk_event_count,
            has_data: true,
            measured_at: Some(measured_at),
        }
    }

    pub fn empty() -> Self {
        Self {
            current_fall_probability: 0.0,
            average_24h_fall_probability: 0.0,
            high_risk_event_count: 0,
            has_data: false,
            measured_at: None,
        }
    }

    /// Weighted fall risk in [0, 1].
    pub fn risk(&self) -> f64 {
        let events = clamp_unit(self.high_risk_event_count as f64 / HIGH_RISK_EVENT_SATURATION);
        clamp_unit(
            0.5 * clamp_unit(self.current_fall_probability)
                + 0.3 * clamp_unit(self.average_24h_fall_probability)
                + 0.2 * events,
        )
    }
}

impl SubsystemSignal for PhysicalSignal {
    const SUBSYSTEM: Subsystem = Subsystem::Physical;

    fn has_data(&self) -> bool {
        self.has_data
    }

    fn measured_at(&self) -> Option<DateTime<Utc>> {
        self.measured_at
    }

    fn stability_score(&self) -> f64 {
        if !self.has_data {
            return NEUTRAL_STABILITY;
        }
        1.0 - self.risk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_signal(current: f64, average: f64, events: u32) -> PhysicalSignal {
        PhysicalSignal::new(current, average, events, Utc::now())
    }

    #[test]
    fn no_risk_is_fully_stable() {
        let signal = make_signal(0.0, 0.0, 0);
        assert_eq!(signal.risk(), 0.0);
        assert_eq!(signal.stability_score(), 1.0);
    }

    #[test]
    fn weighted_risk_combination() {
        // 0.5*0.4 + 0.3*0.2 + 0.2*(5/10) = 0.2 + 0.06 + 0.1
        let signal = make_signal(0.4, 0.2, 5);
        assert!((signal.risk() - 0.36).abs() < 1e-9);
        assert!((signal.stability_score() - 0.64).abs() < 1e-9);
    }

    #[test]
    fn event_term_saturates_at_ten() {
        let ten = make_signal(0.0, 0.0, 10);
        let fifty = make_signal(0.0, 0.0, 50);
        assert!((ten.risk() - 0.2).abs() < 1e-9);
        assert_eq!(ten.risk(), fifty.risk());
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let signal = make_signal(3.0, 2.0, 100);
        assert_eq!(signal.risk(), 1.0);
        assert_eq!(signal.stability_score(), 0.0);
    }

    #[test]
    fn empty_signal_has_no_timestamp() {
        let signal = PhysicalSignal::empty();
        assert!(!signal.has_data());
        assert!(signal.measured_at().is_none());
    }
}
