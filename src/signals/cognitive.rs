use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::Subsystem;

use super::{clamp_unit, SubsystemSignal, NEUTRAL_STABILITY};

const ADHERENCE_WEIGHT: f64 = 0.40;
const MOOD_WEIGHT: f64 = 0.30;
const MOOD_TREND_WEIGHT: f64 = 0.15;
const CHECK_IN_WEIGHT: f64 = 0.15;

/// Trailing window for check-in completion.
pub const CHECK_IN_WINDOW_DAYS: u32 = 7;

/// Behavioural reading: medication adherence, mood and daily check-ins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveSignal {
    /// Doses taken over doses scheduled (0-1).
    pub medication_adherence: f64,
    /// Self-reported mood on a 1-5 scale.
    pub mood_score: f64,
    /// Direction of recent mood, -1 (worsening) to 1 (improving).
    pub mood_trend: f64,
    /// Check-ins completed over the trailing seven days.
    pub check_ins_last_7_days: u32,
    pub has_data: bool,
    pub measured_at: Option<DateTime<Utc>>,
}

impl CognitiveSignal {
    pub fn new(
        medication_adherence: f64,
        mood_score: f64,
        mood_trend: f64,
        check_ins_last_7_days: u32,
        measured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            medication_adherence,
            mood_score,
            mood_trend,
            check_ins_last_7_days,
            has_data: true,
            measured_at: Some(measured_at),
        }
    }

    pub fn empty() -> Self {
        Self {
            medication_adherence: 0.0,
            mood_score: 0.0,
            mood_trend: 0.0,
            check_ins_last_7_days: 0,
            has_data: false,
            measured_at: None,
        }
    }

    /// Mood mapped from 1-5 onto 0-1.
    pub fn normalized_mood(&self) -> f64 {
        clamp_unit((self.mood_score - 1.0) / 4.0)
    }

    /// Trend mapped from -1..1 onto 0-1.
    pub fn normalized_mood_trend(&self) -> f64 {
        clamp_unit((self.mood_trend + 1.0) / 2.0)
    }

    pub fn check_in_completion_rate(&self) -> f64 {
        clamp_unit(self.check_ins_last_7_days as f64 / CHECK_IN_WINDOW_DAYS as f64)
    }
}

impl SubsystemSignal for CognitiveSignal {
    const SUBSYSTEM: Subsystem = Subsystem::Cognitive;

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
            ADHERENCE_WEIGHT * clamp_unit(self.medication_adherence)
                + MOOD_WEIGHT * self.normalized_mood()
                + MOOD_TREND_WEIGHT * self.normalized_mood_trend()
                + CHECK_IN_WEIGHT * self.check_in_completion_rate(),
        )
    }
}
