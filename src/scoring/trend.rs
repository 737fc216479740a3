use serde::{Deserialize, Serialize};

use crate::baseline::SubsystemBaseline;

/// z-scores beyond this are clipped before mapping onto [-1, 1].
const TREND_Z_CLIP: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    BuildingBaseline,
    Improving,
    SlightlyBetter,
    Consistent,
    SlightlyBelow,
    BelowBaseline,
}

impl TrendDirection {
    /// Bucket a trend value already mapped onto [-1, 1].
    pub fn from_trend(trend: f64) -> Self {
        if trend > 0.3 {
            Self::Improving
        } else if trend > 0.1 {
            Self::SlightlyBetter
        } else if trend < -0.3 {
            Self::BelowBaseline
        } else if trend < -0.1 {
            Self::SlightlyBelow
        } else {
            Self::Consistent
        }
    }
}

/// Where today's composite sits against the composite baseline.
///
/// `score` is on the 0-100 scale; the overall baseline tracks it on 0-1.
pub fn compute_trend(overall: &SubsystemBaseline, score: f64) -> (f64, TrendDirection) {
    if !overall.is_reliable() {
        return (0.0, TrendDirection::BuildingBaseline);
    }
    let z = overall.z_score(score / 100.0).clamp(-TREND_Z_CLIP, TREND_Z_CLIP);
    let trend = z / TREND_Z_CLIP;
    (trend, TrendDirection::from_trend(trend))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn make_overall(mean: f64, std: f64, samples: u32) -> SubsystemBaseline {
        SubsystemBaseline {
            mean,
            standard_deviation: std,
            min_value: mean,
            max_value: mean,
            sample_count: samples,
            last_updated: Some(Utc::now()),
        }
    }

    #[test]
    fn unreliable_overall_is_building() {
        let (trend, direction) = compute_trend(&make_overall(0.7, 0.1, 3), 95.0);
        assert_eq!(trend, 0.0);
        assert_eq!(direction, TrendDirection::BuildingBaseline);
    }

    #[test]
    fn trend_is_clipped_z_over_three() {
        // z = (0.85 - 0.7) / 0.1 = 1.5 -> 0.5
        let (trend, direction) = compute_trend(&make_overall(0.7, 0.1, 10), 85.0);
        assert!((trend - 0.5).abs() < 1e-9);
        assert_eq!(direction, TrendDirection::Improving);

        let (trend, direction) = compute_trend(&make_overall(0.9, 0.01, 10), 10.0);
        assert_eq!(trend, -1.0);
        assert_eq!(direction, TrendDirection::BelowBaseline);
    }

    #[test]
    fn direction_buckets() {
        assert_eq!(TrendDirection::from_trend(0.31), TrendDirection::Improving);
        assert_eq!(TrendDirection::from_trend(0.3), TrendDirection::SlightlyBetter);
        assert_eq!(TrendDirection::from_trend(0.1), TrendDirection::Consistent);
        assert_eq!(TrendDirection::from_trend(-0.1), TrendDirection::Consistent);
        assert_eq!(TrendDirection::from_trend(-0.2), TrendDirection::SlightlyBelow);
        assert_eq!(TrendDirection::from_trend(-0.31), TrendDirection::BelowBaseline);
    }

    #[test]
    fn zero_spread_is_consistent() {
        let (trend, direction) = compute_trend(&make_overall(0.8, 0.0, 10), 40.0);
        assert_eq!(trend, 0.0);
        assert_eq!(direction, TrendDirection::Consistent);
    }
}
