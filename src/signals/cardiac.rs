use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{ArrhythmiaRiskLevel, Subsystem};

use super::{clamp_unit, SubsystemSignal, NEUTRAL_STABILITY};

/// Reference resting heart rate used to scale out-of-range readings.
const REFERENCE_HEART_RATE_BPM: f64 = 75.0;
const NORMAL_HEART_RATE_LOW_BPM: f64 = 50.0;
const NORMAL_HEART_RATE_HIGH_BPM: f64 = 100.0;
/// SDNN at or above this carries no HRV risk.
const HEALTHY_SDNN_MS: f64 = 100.0;

/// Arrhythmia classifier probability bands, shared with the inference service.
pub mod risk_thresholds {
    pub const LOW: f64 = 0.30;
    pub const MODERATE: f64 = 0.50;
    pub const ELEVATED: f64 = 0.70;
}

/// Cardiac reading: classifier output plus derived heart-rate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardiacSignal {
    /// Probability of elevated arrhythmia risk from the classifier (0-1).
    pub arrhythmia_risk: f64,
    pub heart_rate_bpm: f64,
    /// Standard deviation of NN intervals.
    pub hrv_sdnn_ms: f64,
    pub has_data: bool,
    pub measured_at: Option<DateTime<Utc>>,
}

impl CardiacSignal {
    pub fn new(
        arrhythmia_risk: f64,
        heart_rate_bpm: f64,
        hrv_sdnn_ms: f64,
        measured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            arrhythmia_risk,
            heart_rate_bpm,
            hrv_sdnn_ms,
            has_data: true,
            measured_at: Some(measured_at),
        }
    }

    pub fn empty() -> Self {
        Self {
            arrhythmia_risk: 0.0,
            heart_rate_bpm: 0.0,
            hrv_sdnn_ms: 0.0,
            has_data: false,
            measured_at: None,
        }
    }

    /// Zero inside [50, 100] bpm, otherwise distance from 75 bpm scaled by 75.
    pub fn heart_rate_risk(&self) -> f64 {
        let bpm = self.heart_rate_bpm;
        if (NORMAL_HEART_RATE_LOW_BPM..=NORMAL_HEART_RATE_HIGH_BPM).contains(&bpm) {
            return 0.0;
        }
        clamp_unit((bpm - REFERENCE_HEART_RATE_BPM).abs() / REFERENCE_HEART_RATE_BPM)
    }

    pub fn hrv_risk(&self) -> f64 {
        clamp_unit(1.0 - self.hrv_sdnn_ms / HEALTHY_SDNN_MS)
    }

    pub fn risk(&self) -> f64 {
        clamp_unit(
            0.5 * clamp_unit(self.arrhythmia_risk)
                + 0.25 * self.heart_rate_risk()
                + 0.25 * self.hrv_risk(),
        )
    }

    /// Categorical band for the classifier probability.
    pub fn arrhythmia_risk_level(&self) -> ArrhythmiaRiskLevel {
        let p = clamp_unit(self.arrhythmia_risk);
        if p < risk_thresholds::LOW {
            ArrhythmiaRiskLevel::Low
        } else if p < risk_thresholds::MODERATE {
            ArrhythmiaRiskLevel::Moderate
        } else if p < risk_thresholds::ELEVATED {
            ArrhythmiaRiskLevel::Elevated
        } else {
            ArrhythmiaRiskLevel::High
        }
    }
}

impl SubsystemSignal for CardiacSignal {
    const SUBSYSTEM: Subsystem = Subsystem::Cardiac;

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

    fn make_signal(arrhythmia: f64, bpm: f64, sdnn: f64) -> CardiacSignal {
        CardiacSignal::new(arrhythmia, bpm, sdnn, Utc::now())
    }

    #[test]
    fn heart_rate_inside_normal_band_has_no_risk() {
        assert_eq!(make_signal(0.0, 50.0, 100.0).heart_rate_risk(), 0.0);
        assert_eq!(make_signal(0.0, 100.0, 100.0).heart_rate_risk(), 0.0);
        assert_eq!(make_signal(0.0, 72.0, 100.0).heart_rate_risk(), 0.0);
    }

    #[test]
    fn heart_rate_outside_band_scales_from_reference() {
        // |120 - 75| / 75 = 0.6
        assert!((make_signal(0.0, 120.0, 100.0).heart_rate_risk() - 0.6).abs() < 1e-9);
        // |45 - 75| / 75 = 0.4
        assert!((make_signal(0.0, 45.0, 100.0).heart_rate_risk() - 0.4).abs() < 1e-9);
        assert_eq!(make_signal(0.0, 200.0, 100.0).heart_rate_risk(), 1.0);
    }

    #[test]
    fn hrv_risk_inverse_to_sdnn() {
        assert!((make_signal(0.0, 70.0, 40.0).hrv_risk() - 0.6).abs() < 1e-9);
        assert_eq!(make_signal(0.0, 70.0, 150.0).hrv_risk(), 0.0);
        assert_eq!(make_signal(0.0, 70.0, 0.0).hrv_risk(), 1.0);
    }

    #[test]
    fn combined_risk_and_stability() {
        // 0.5*0.2 + 0.25*0.6 + 0.25*0.5 = 0.1 + 0.15 + 0.125
        let signal = make_signal(0.2, 120.0, 50.0);
        assert!((signal.risk() - 0.375).abs() < 1e-9);
        assert!((signal.stability_score() - 0.625).abs() < 1e-9);
    }

    #[test]
    fn arrhythmia_risk_levels() {
        assert_eq!(make_signal(0.1, 70.0, 80.0).arrhythmia_risk_level(), ArrhythmiaRiskLevel::Low);
        assert_eq!(
            make_signal(0.3, 70.0, 80.0).arrhythmia_risk_level(),
            ArrhythmiaRiskLevel::Moderate
        );
        assert_eq!(
            make_signal(0.55, 70.0, 80.0).arrhythmia_risk_level(),
            ArrhythmiaRiskLevel::Elevated
        );
        assert_eq!(make_signal(0.9, 70.0, 80.0).arrhythmia_risk_level(), ArrhythmiaRiskLevel::High);
    }

    #[test]
    fn empty_signal_is_neutral() {
        let signal = CardiacSignal::empty();
        assert!(!signal.has_data());
        assert_eq!(signal.stability_score(), NEUTRAL_STABILITY);
    }
}
