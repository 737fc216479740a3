use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// EMA smoothing factor (about a seven-sample half-life).
pub const EMA_ALPHA: f64 = 0.2;
/// Samples needed before a baseline is trusted.
pub const RELIABLE_SAMPLE_COUNT: u32 = 7;
/// |z| strictly above this is anomalous.
pub const ANOMALY_Z_THRESHOLD: f64 = 2.0;
/// z strictly below this is a decline.
pub const DECLINE_Z_THRESHOLD: f64 = -1.5;
/// Spreads below this are rounding noise and treated as zero.
const MIN_STANDARD_DEVIATION: f64 = 1e-9;

/// Adaptive statistics for one stream of stability observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemBaseline {
    pub mean: f64,
    pub standard_deviation: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub sample_count: u32,
    /// `None` until the first real observation.
    pub last_updated: Option<DateTime<Utc>>,
}

impl SubsystemBaseline {
    /// Starting point for a new patient. Centred so a first real reading is not anomalous.
    pub fn neutral() -> Self {
        Self {
            mean: 0.5,
            standard_deviation: 0.15,
            min_value: 0.3,
            max_value: 0.7,
            sample_count: 0,
            last_updated: None,
        }
    }

    pub fn is_reliable(&self) -> bool {
        self.sample_count >= RELIABLE_SAMPLE_COUNT
    }

    /// Return the baseline updated with one observation.
    ///
    /// The first observation replaces the neutral prior outright. Later ones
    /// move the mean by EMA and the variance by an EMA of the squared distance
    /// from the *previous* mean.
    #[must_use]
    pub fn add_observation(&self, value: f64, at: DateTime<Utc>) -> Self {
        if self.sample_count == 0 {
            return Self {
                mean: value,
                standard_deviation: 0.0,
                min_value: value,
                max_value: value,
                sample_count: 1,
                last_updated: Some(at),
            };
        }

        let delta = value - self.mean;
        let mean = self.mean * (1.0 - EMA_ALPHA) + value * EMA_ALPHA;
        let variance = self.standard_deviation.powi(2) * (1.0 - EMA_ALPHA) + EMA_ALPHA * delta * delta;

        Self {
            mean,
            standard_deviation: variance.max(0.0).sqrt(),
            min_value: self.min_value.min(value),
            max_value: self.max_value.max(value),
            sample_count: self.sample_count.saturating_add(1),
            last_updated: Some(at),
        }
    }

    /// Standard deviations between `value` and the mean. 0 when there is no spread.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.standard_deviation.is_nan() || self.standard_deviation < MIN_STANDARD_DEVIATION {
            return 0.0;
        }
        (value - self.mean) / self.standard_deviation
    }

    pub fn is_anomalous(&self, value: f64) -> bool {
        self.z_score(value).abs() > ANOMALY_Z_THRESHOLD
    }

    /// One-sided: only readings well below the mean count.
    pub fn indicates_decline(&self, value: f64) -> bool {
        self.z_score(value) < DECLINE_Z_THRESHOLD
    }
}

impl Default for SubsystemBaseline {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_baseline(mean: f64, std: f64, samples: u32) -> SubsystemBaseline {
        SubsystemBaseline {
            mean,
            standard_deviation: std,
            min_value: mean - std,
            max_value: mean + std,
            sample_count: samples,
            last_updated: Some(Utc::now()),
        }
    }

    #[test]
    fn neutral_baseline_values() {
        let baseline = SubsystemBaseline::neutral();
        assert_eq!(baseline.mean, 0.5);
        assert_eq!(baseline.standard_deviation, 0.15);
        assert_eq!(baseline.min_value, 0.3);
        assert_eq!(baseline.max_value, 0.7);
        assert_eq!(baseline.sample_count, 0);
        assert!(baseline.last_updated.is_none());
        assert!(!baseline.is_reliable());
    }

    #[test]
    fn first_observation_replaces_prior() {
        let now = Utc::now();
        let baseline = SubsystemBaseline::neutral().add_observation(0.82, now);
        assert_eq!(baseline.mean, 0.82);
        assert_eq!(baseline.standard_deviation, 0.0);
        assert_eq!(baseline.min_value, 0.82);
        assert_eq!(baseline.max_value, 0.82);
        assert_eq!(baseline.sample_count, 1);
        assert_eq!(baseline.last_updated, Some(now));
    }

    #[test]
    fn update_uses_previous_mean_for_variance() {
        let now = Utc::now();
        let baseline = make_baseline(0.5, 0.1, 3).add_observation(1.0, now);
        // mean = 0.5*0.8 + 1.0*0.2
        assert!((baseline.mean - 0.6).abs() < 1e-12);
        // variance = 0.01*0.8 + 0.2*(1.0-0.5)^2 = 0.008 + 0.05
        assert!((baseline.standard_deviation - 0.058f64.sqrt()).abs() < 1e-12);
        assert_eq!(baseline.max_value, 1.0);
        assert_eq!(baseline.sample_count, 4);
    }

    #[test]
    fn original_is_unchanged_by_update() {
        let original = make_baseline(0.5, 0.1, 3);
        let _ = original.add_observation(0.9, Utc::now());
        assert_eq!(original.sample_count, 3);
        assert_eq!(original.mean, 0.5);
    }

    #[test]
    fn repeated_value_converges() {
        let now = Utc::now();
        let target = 0.9;
        let mut baseline = make_baseline(0.4, 0.2, 5);
        let mut last_gap = (baseline.mean - target).abs();

        for i in 0..100 {
            baseline = baseline.add_observation(target, now);
            let gap = (baseline.mean - target).abs();
            assert!(gap < last_gap, "mean gap did not shrink at iteration {i}");
            last_gap = gap;
        }

        assert!(last_gap < 1e-4);
        assert!(baseline.standard_deviation < 1e-3);
    }

    #[test]
    fn z_score_guarded_for_zero_spread() {
        let baseline = make_baseline(0.7, 0.0, 10);
        assert_eq!(baseline.z_score(0.1), 0.0);
        assert!(!baseline.is_anomalous(0.1));
        assert!(!baseline.indicates_decline(0.1));
    }

    #[test]
    fn anomaly_boundary_is_exclusive() {
        let baseline = make_baseline(0.5, 0.25, 10);
        // Exactly two standard deviations in each direction.
        assert_eq!(baseline.z_score(1.0), 2.0);
        assert!(!baseline.is_anomalous(1.0));
        assert_eq!(baseline.z_score(0.0), -2.0);
        assert!(!baseline.is_anomalous(0.0));
        assert!(baseline.is_anomalous(1.01));
        assert!(baseline.is_anomalous(-0.01));
    }

    #[test]
    fn decline_is_one_sided() {
        let baseline = make_baseline(0.8, 0.05, 10);
        assert!((baseline.z_score(0.5) + 6.0).abs() < 1e-9);
        assert!(baseline.indicates_decline(0.5));
        assert!(!baseline.indicates_decline(1.0));
        assert!(baseline.is_anomalous(1.0));
    }

    #[test]
    fn reliability_needs_seven_samples() {
        assert!(!make_baseline(0.5, 0.1, 6).is_reliable());
        assert!(make_baseline(0.5, 0.1, 7).is_reliable());
    }
}
