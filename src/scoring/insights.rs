//! Advisory findings per subsystem.
//!
//! Findings are structured tags carrying the values that triggered them; the
//! human-readable sentence comes from `MessageTemplates`. Nothing here feeds
//! back into the numeric score.

use serde::{Deserialize, Serialize};

use crate::models::enums::Subsystem;
use crate::models::input::StabilityInput;
use crate::signals::{CardiacSignal, CognitiveSignal, PhysicalSignal, SleepSignal};

use super::messages::MessageTemplates;

pub mod thresholds {
    pub const FALL_PROBABILITY_HIGH: f64 = 0.7;
    pub const FALL_AVERAGE_HIGH: f64 = 0.5;
    pub const HIGH_RISK_EVENTS: u32 = 3;

    pub const ARRHYTHMIA_RISK_HIGH: f64 = 0.7;
    pub const HEART_RATE_LOW_BPM: f64 = 50.0;
    pub const HEART_RATE_HIGH_BPM: f64 = 100.0;
    pub const SDNN_LOW_MS: f64 = 20.0;

    pub const SLEEP_SHORT_HOURS: f64 = 6.0;
    pub const SLEEP_VARIANCE_HIGH_HOURS: f64 = 1.5;
    pub const SLEEP_EFFICIENCY_LOW: f64 = 0.75;

    pub const ADHERENCE_LOW: f64 = 0.8;
    pub const MOOD_LOW: f64 = 2.0;
    pub const MOOD_TREND_FALLING: f64 = -0.3;
    pub const CHECK_INS_LOW: u32 = 3;
}

/// Something notable about a subsystem reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    ElevatedFallRisk { probability: f64 },
    RepeatedHighRiskEvents { count: u32 },
    ElevatedArrhythmiaIndicators { risk: f64 },
    HeartRateOutOfRange { bpm: f64 },
    LowHeartRateVariability { sdnn_ms: f64 },
    ShortSleep { hours: f64 },
    IrregularSleepSchedule { variance_hours: f64 },
    LowSleepEfficiency { efficiency: f64 },
    MissedMedications { adherence: f64 },
    LowMood { score: f64 },
    DecliningMood { trend: f64 },
    InfrequentCheckIns { completed: u32 },
}

impl Finding {
    pub fn subsystem(&self) -> Subsystem {
        match self {
            Self::ElevatedFallRisk { .. } | Self::RepeatedHighRiskEvents { .. } => {
                Subsystem::Physical
            }
            Self::ElevatedArrhythmiaIndicators { .. }
            | Self::HeartRateOutOfRange { .. }
            | Self::LowHeartRateVariability { .. } => Subsystem::Cardiac,
            Self::ShortSleep { .. }
            | Self::IrregularSleepSchedule { .. }
            | Self::LowSleepEfficiency { .. } => Subsystem::Sleep,
            Self::MissedMedications { .. }
            | Self::LowMood { .. }
            | Self::DecliningMood { .. }
            | Self::InfrequentCheckIns { .. } => Subsystem::Cognitive,
        }
    }

    pub fn message(&self) -> String {
        MessageTemplates::finding(self)
    }
}

/// Findings in priority order, most important first.
pub fn physical_findings(signal: &PhysicalSignal) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !signal.has_data {
        return findings;
    }
    if signal.current_fall_probability > thresholds::FALL_PROBABILITY_HIGH
        || signal.average_24h_fall_probability > thresholds::FALL_AVERAGE_HIGH
    {
        findings.push(Finding::ElevatedFallRisk {
            probability: signal
                .current_fall_probability
                .max(signal.average_24h_fall_probability),
        });
    }
    if signal.high_risk_event_count >= thresholds::HIGH_RISK_EVENTS {
        findings.push(Finding::RepeatedHighRiskEvents {
            count: signal.high_risk_event_count,
        });
    }
    findings
}

pub fn cardiac_findings(signal: &CardiacSignal) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !signal.has_data {
        return findings;
    }
    if signal.arrhythmia_risk > thresholds::ARRHYTHMIA_RISK_HIGH {
        findings.push(Finding::ElevatedArrhythmiaIndicators {
            risk: signal.arrhythmia_risk,
        });
    }
    if signal.heart_rate_bpm < thresholds::HEART_RATE_LOW_BPM
        || signal.heart_rate_bpm > thresholds::HEART_RATE_HIGH_BPM
    {
        findings.push(Finding::HeartRateOutOfRange {
            bpm: signal.heart_rate_bpm,
        });
    }
    if signal.hrv_sdnn_ms < thresholds::SDNN_LOW_MS {
        findings.push(Finding::LowHeartRateVariability {
            sdnn_ms: signal.hrv_sdnn_ms,
        });
    }
    findings
}

pub fn sleep_findings(signal: &SleepSignal) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !signal.has_data {
        return findings;
    }
    if signal.duration_hours < thresholds::SLEEP_SHORT_HOURS {
        findings.push(Finding::ShortSleep {
            hours: signal.duration_hours,
        });
    }
    if signal.duration_variance_hours > thresholds::SLEEP_VARIANCE_HIGH_HOURS {
        findings.push(Finding::IrregularSleepSchedule {
            variance_hours: signal.duration_variance_hours,
        });
    }
    if signal.efficiency < thresholds::SLEEP_EFFICIENCY_LOW {
        findings.push(Finding::LowSleepEfficiency {
            efficiency: signal.efficiency,
        });
    }
    findings
}

pub fn cognitive_findings(signal: &CognitiveSignal) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !signal.has_data {
        return findings;
    }
    if signal.medication_adherence < thresholds::ADHERENCE_LOW {
        findings.push(Finding::MissedMedications {
            adherence: signal.medication_adherence,
        });
    }
    if signal.mood_score <= thresholds::MOOD_LOW {
        findings.push(Finding::LowMood {
            score: signal.mood_score,
        });
    }
    if signal.mood_trend < thresholds::MOOD_TREND_FALLING {
        findings.push(Finding::DecliningMood {
            trend: signal.mood_trend,
        });
    }
    if signal.check_ins_last_7_days < thresholds::CHECK_INS_LOW {
        findings.push(Finding::InfrequentCheckIns {
            completed: signal.check_ins_last_7_days,
        });
    }
    findings
}

/// Most important finding for a subsystem, `None` when nothing is notable.
pub fn primary_finding(input: &StabilityInput, subsystem: Subsystem) -> Option<Finding> {
    let findings = match subsystem {
        Subsystem::Physical => physical_findings(&input.physical),
        Subsystem::Cardiac => cardiac_findings(&input.cardiac),
        Subsystem::Sleep => sleep_findings(&input.sleep),
        Subsystem::Cognitive => cognitive_findings(&input.cognitive),
    };
    findings.into_iter().next()
}
