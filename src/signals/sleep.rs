use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::Subsystem;

use super::{clamp_unit, SubsystemSignal, NEUTRAL_STABILITY};

/// Band weights. They sum to 1.0.
const DURATION_WEIGHT: f64 = 0.25;
const VARIANCE_WEIGHT: f64 = 0.20;
const DEEP_SLEEP_WEIGHT: f64 = 0.15;
const REM_SLEEP_WEIGHT: f64 = 0.15;
const EFFICIENCY_WEIGHT: f64 = 0.15;
const CONSISTENCY_WEIGHT: f64 = 0.10;

/// Share of a band's weight awarded inside the partial range.
const PARTIAL_CREDIT: f64 = 0.6;
/// Share of a band's weight awarded outside both ranges.
const MINIMAL_CREDIT: f64 = 0.2;
/// Night-to-night duration variance (hours) at which the variance band is empty.
const VARIANCE_SATURATION_HOURS: f64 = 2.0;

/// Aggregated sleep session metrics from the sleep collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSignal {
    pub duration_hours: f64,
    /// Variance of nightly duration over the recent window, in hours.
    pub duration_variance_hours: f64,
    pub deep_sleep_percent: f64,
    pub rem_sleep_percent: f64,
    /// Time asleep over time in bed (0-1).
    pub efficiency: f64,
    /// Regularity of bedtime (0-1, 1 = same time every night).
    pub bedtime_consistency: f64,
    pub has_data: bool,
    pub measured_at: Option<DateTime<Utc>>,
}

impl SleepSignal {
    pub fn new(
        duration_hours: f64,
        duration_variance_hours: f64,
        deep_sleep_percent: f64,
        rem_sleep_percent: f64,
        efficiency: f64,
        bedtime_consistency: f64,
        measured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            duration_hours,
            duration_variance_hours,
            deep_sleep_percent,
            rem_sleep_percent,
            efficiency,
            bedtime_consistency,
            has_data: true,
            measured_at: Some(measured_at),
        }
    }

    pub fn empty() -> Self {
        Self {
            duration_hours: 0.0,
            duration_variance_hours: 0.0,
            deep_sleep_percent: 0.0,
            rem_sleep_percent: 0.0,
            efficiency: 0.0,
            bedtime_consistency: 0.0,
            has_data: false,
            measured_at: None,
        }
    }

    pub fn duration_component(&self) -> f64 {
        banded(self.duration_hours, (7.0, 9.0), (6.0, 10.0), DURATION_WEIGHT)
    }

    pub fn variance_component(&self) -> f64 {
        let spread = clamp_unit(self.duration_variance_hours / VARIANCE_SATURATION_HOURS);
        VARIANCE_WEIGHT * (1.0 - spread)
    }

    pub fn deep_sleep_component(&self) -> f64 {
        banded(self.deep_sleep_percent, (15.0, 25.0), (10.0, 30.0), DEEP_SLEEP_WEIGHT)
    }

    pub fn rem_sleep_component(&self) -> f64 {
        banded(self.rem_sleep_percent, (20.0, 25.0), (15.0, 30.0), REM_SLEEP_WEIGHT)
    }

    pub fn efficiency_component(&self) -> f64 {
        EFFICIENCY_WEIGHT * clamp_unit(self.efficiency)
    }

    pub fn consistency_component(&self) -> f64 {
        CONSISTENCY_WEIGHT * clamp_unit(self.bedtime_consistency)
    }
}

/// Full weight inside `full`, partial inside `partial`, minimal otherwise.
fn banded(value: f64, full: (f64, f64), partial: (f64, f64), weight: f64) -> f64 {
    if value >= full.0 && value <= full.1 {
        weight
    } else if value >= partial.0 && value <= partial.1 {
        weight * PARTIAL_CREDIT
    } else {
        weight * MINIMAL_CREDIT
    }
}

impl SubsystemSignal for SleepSignal {
    const SUBSYSTEM: Subsystem = Subsystem::Sleep;

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
        clamp_unit(
            self.duration_component()
                + self.variance_component()
                + self.deep_sleep_component()
                + self.rem_sleep_component()
                + self.efficiency_component()
                + self.consistency_component(),
        )
    }
}
