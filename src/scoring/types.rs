use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{StabilityLevel, Subsystem};

use super::insights::Finding;
use super::messages::MessageTemplates;
use super::trend::TrendDirection;

// ---------------------------------------------------------------------------
// SubsystemContribution
// ---------------------------------------------------------------------------

/// One explanatory row per subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemContribution {
    #[serde(rename = "name")]
    pub subsystem: Subsystem,
    pub label: String,
    /// 0 when the subsystem had no data.
    pub stability_score: f64,
    pub weight: f64,
    /// `stability_score * weight * 100`.
    pub weighted_contribution: f64,
    pub is_detractor: bool,
    pub has_data: bool,
    pub insight: Option<String>,
    pub finding: Option<Finding>,
}

impl SubsystemContribution {
    pub fn no_data(subsystem: Subsystem) -> Self {
        Self {
            subsystem,
            label: subsystem.label().to_string(),
            stability_score: 0.0,
            weight: 0.0,
            weighted_contribution: 0.0,
            is_detractor: false,
            has_data: false,
            insight: None,
            finding: None,
        }
    }
}

// ---------------------------------------------------------------------------
// StabilityScoreResult
// ---------------------------------------------------------------------------

/// Output of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityScoreResult {
    /// Composite score in [0, 100].
    pub score: f64,
    pub level: StabilityLevel,
    pub contributions: Vec<SubsystemContribution>,
    pub detractors: Vec<Subsystem>,
    pub is_reliable: bool,
    /// [0, 1]
    pub confidence: f64,
    /// [-1, 1], 0 while the composite baseline is still building.
    pub trend: f64,
    pub trend_direction: TrendDirection,
    pub trend_description: String,
    pub computed_at: DateTime<Utc>,
    pub warnings: Vec<String>,
}

impl StabilityScoreResult {
    /// Result for a pass below the two-subsystem floor. No partial scoring.
    pub fn insufficient_data(computed_at: DateTime<Utc>) -> Self {
        Self {
            score: 0.0,
            level: StabilityLevel::Alert,
            contributions: Subsystem::ALL
                .into_iter()
                .map(SubsystemContribution::no_data)
                .collect(),
            detractors: Vec::new(),
            is_reliable: false,
            confidence: 0.0,
            trend: 0.0,
            trend_direction: TrendDirection::BuildingBaseline,
            trend_description: MessageTemplates::trend(TrendDirection::BuildingBaseline),
            computed_at,
            warnings: vec![MessageTemplates::insufficient_data()],
        }
    }

    pub fn contribution(&self, subsystem: Subsystem) -> Option<&SubsystemContribution> {
        self.contributions.iter().find(|c| c.subsystem == subsystem)
    }

    /// Flat record for analytics and logging.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "score": self.score,
            "level": self.level.as_str(),
            "contributions": self.contributions.iter().map(|c| serde_json::json!({
                "name": c.subsystem.as_str(),
                "label": c.label,
                "stability_score": c.stability_score,
                "weight": c.weight,
                "weighted_contribution": c.weighted_contribution,
                "is_detractor": c.is_detractor,
                "has_data": c.has_data,
                "insight": c.insight,
            })).collect::<Vec<_>>(),
            "detractors": self.detractors.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
            "is_reliable": self.is_reliable,
            "confidence": self.confidence,
            "trend": self.trend,
            "trend_description": self.trend_description,
            "computed_at": self.computed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "warnings": self.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_shape() {
        let result = StabilityScoreResult::insufficient_data(Utc::now());
        assert_eq!(result.score, 0.0);
        assert!(!result.is_reliable);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.contributions.len(), 4);
        assert!(result.contributions.iter().all(|c| !c.has_data));
        assert!(result.detractors.is_empty());
    }

    #[test]
    fn json_is_flat_with_names() {
        let computed_at = DateTime::parse_from_rfc3339("2026-03-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let result = StabilityScoreResult::insufficient_data(computed_at);
        let json = result.to_json();

        assert_eq!(json["score"], 0.0);
        assert_eq!(json["level"], "alert");
        assert_eq!(json["computed_at"], "2026-03-01T08:30:00.000Z");
        assert_eq!(json["contributions"][0]["name"], "physical");
        assert_eq!(json["contributions"][3]["name"], "cognitive");
        assert_eq!(json["is_reliable"], false);
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn contribution_lookup() {
        let result = StabilityScoreResult::insufficient_data(Utc::now());
        let sleep = result.contribution(Subsystem::Sleep).unwrap();
        assert_eq!(sleep.label, "Sleep Quality");
        assert_eq!(sleep.weight, 0.0);
    }
}
