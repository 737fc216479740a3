use crate::models::enums::Subsystem;

use super::insights::Finding;
use super::trend::TrendDirection;

/// Message template builder for consistent, calm framing.
/// Wording is advisory; only the triggering conditions are contractual.
pub struct MessageTemplates;

impl MessageTemplates {
    /// Fewer than two subsystems reported data.
    pub fn insufficient_data() -> String {
        "Insufficient data: at least 2 of 4 health areas need recent readings \
         before a stability score can be calculated."
            .to_string()
    }

    /// A subsystem reading sits well below this person's own baseline.
    pub fn decline(subsystem: Subsystem) -> String {
        let detail = match subsystem {
            Subsystem::Physical => "Fall risk is noticeably higher than usual",
            Subsystem::Cardiac => "Heart readings are noticeably worse than usual",
            Subsystem::Sleep => "Sleep quality has dropped below its usual level",
            Subsystem::Cognitive => "Mood and medication routine have slipped below usual",
        };
        format!(
            "{} ({} is below personal baseline).",
            detail,
            subsystem.label()
        )
    }

    pub fn trend(direction: TrendDirection) -> String {
        match direction {
            TrendDirection::BuildingBaseline => "Building baseline".to_string(),
            TrendDirection::Improving => "Improving compared to baseline".to_string(),
            TrendDirection::SlightlyBetter => "Slightly better than baseline".to_string(),
            TrendDirection::Consistent => "Consistent with baseline".to_string(),
            TrendDirection::SlightlyBelow => "Slightly below baseline".to_string(),
            TrendDirection::BelowBaseline => "Below baseline".to_string(),
        }
    }

    pub fn finding(finding: &Finding) -> String {
        match finding {
            Finding::ElevatedFallRisk { probability } => format!(
                "Fall risk is elevated ({:.0}% probability).",
                probability * 100.0
            ),
            Finding::RepeatedHighRiskEvents { count } => {
                format!("{} high-risk movement events in the last 24 hours.", count)
            }
            Finding::ElevatedArrhythmiaIndicators { .. } => {
                "Elevated arrhythmia indicators. Consider sharing this with a doctor.".to_string()
            }
            Finding::HeartRateOutOfRange { bpm } => {
                format!("Heart rate of {:.0} bpm is outside the usual resting range.", bpm)
            }
            Finding::LowHeartRateVariability { sdnn_ms } => {
                format!("Heart rate variability is low ({:.0} ms).", sdnn_ms)
            }
            Finding::ShortSleep { hours } => {
                format!("{:.1} hours of sleep is below the recommended duration.", hours)
            }
            Finding::IrregularSleepSchedule { .. } => {
                "Sleep duration varies a lot from night to night.".to_string()
            }
            Finding::LowSleepEfficiency { efficiency } => format!(
                "Only {:.0}% of time in bed was spent asleep.",
                efficiency * 100.0
            ),
            Finding::MissedMedications { adherence } => format!(
                "Some medication doses were missed ({:.0}% taken).",
                adherence * 100.0
            ),
            Finding::LowMood { .. } => "Recent mood check-ins have been low.".to_string(),
            Finding::DecliningMood { .. } => "Mood has been trending down.".to_string(),
            Finding::InfrequentCheckIns { completed } => {
                format!("Only {} check-ins completed this week.", completed)
            }
        }
    }
}
