use chrono::{DateTime, Utc};

use crate::baseline::PersonalBaseline;
use crate::config::{ConfigError, ScoringConfig};
use crate::models::enums::{StabilityLevel, Subsystem};
use crate::models::input::StabilityInput;

use super::confidence::{compute_confidence, RELIABLE_CONFIDENCE};
use super::insights::primary_finding;
use super::messages::MessageTemplates;
use super::trend::compute_trend;
use super::types::{StabilityScoreResult, SubsystemContribution};
use super::weights::{calculate_adaptive_weights, SubsystemWeights};

/// Fuses the four subsystem signals into one explainable score.
///
/// Stateless apart from its configuration: every call takes an input snapshot
/// and a baseline snapshot and performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct StabilityEngine {
    config: ScoringConfig,
}

impl StabilityEngine {
    /// Engine over a validated configuration.
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn compute_score(
        &self,
        input: &StabilityInput,
        baseline: &PersonalBaseline,
    ) -> StabilityScoreResult {
        self.compute_score_at(input, baseline, Utc::now())
    }

    /// As `compute_score`, with the clock supplied by the caller.
    pub fn compute_score_at(
        &self,
        input: &StabilityInput,
        baseline: &PersonalBaseline,
        now: DateTime<Utc>,
    ) -> StabilityScoreResult {
        if !input.has_minimum_data() {
            tracing::debug!(
                subsystems_with_data = input.subsystems_with_data(),
                "Not enough subsystems for a score"
            );
            return StabilityScoreResult::insufficient_data(now);
        }

        let weights = calculate_adaptive_weights(
            &self.config.default_weights,
            input,
            baseline,
            self.config.anomaly_weight_boost,
        );

        let score = weighted_score(input, &weights);
        let level = self.classify(score);
        let contributions = self.build_contributions(input, &weights);

        let detractors = contributions
            .iter()
            .filter(|c| c.is_detractor)
            .map(|c| c.subsystem)
            .collect();

        let (trend, trend_direction) = compute_trend(&baseline.overall, score);
        let confidence = compute_confidence(input, baseline, now);

        StabilityScoreResult {
            score,
            level,
            contributions,
            detractors,
            is_reliable: confidence >= RELIABLE_CONFIDENCE,
            confidence,
            trend,
            trend_direction,
            trend_description: MessageTemplates::trend(trend_direction),
            computed_at: now,
            warnings: decline_warnings(input, baseline),
        }
    }

    /// Level for a 0-100 score, thresholds checked top-down.
    pub fn classify(&self, score: f64) -> StabilityLevel {
        if score >= self.config.stable_threshold {
            StabilityLevel::Stable
        } else if score >= self.config.moderate_threshold {
            StabilityLevel::Moderate
        } else if score >= self.config.attention_threshold {
            StabilityLevel::Attention
        } else {
            StabilityLevel::Alert
        }
    }

    fn build_contributions(
        &self,
        input: &StabilityInput,
        weights: &SubsystemWeights,
    ) -> Vec<SubsystemContribution> {
        Subsystem::ALL
            .into_iter()
            .map(|subsystem| match input.stability_of(subsystem) {
                None => SubsystemContribution::no_data(subsystem),
                Some(stability) => {
                    let weight = weights.get(subsystem);
                    let finding = primary_finding(input, subsystem);
                    SubsystemContribution {
                        subsystem,
                        label: subsystem.label().to_string(),
                        stability_score: stability,
                        weight,
                        weighted_contribution: stability * weight * 100.0,
                        is_detractor: stability < self.config.detractor_threshold,
                        has_data: true,
                        insight: finding.as_ref().map(|f| f.message()),
                        finding,
                    }
                }
            })
            .collect()
    }
}

/// Score with the default configuration.
pub fn compute_score(input: &StabilityInput, baseline: &PersonalBaseline) -> StabilityScoreResult {
    StabilityEngine::default().compute_score(input, baseline)
}

/// Weighted mean of present subsystems on the 0-100 scale.
fn weighted_score(input: &StabilityInput, weights: &SubsystemWeights) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for subsystem in Subsystem::ALL {
        if let Some(stability) = input.stability_of(subsystem) {
            let weight = weights.get(subsystem);
            total_score += stability * weight * 100.0;
            total_weight += weight;
        }
    }

    if total_weight <= 0.0 {
        return 0.0;
    }
    (total_score / total_weight).clamp(0.0, 100.0)
}

/// Decline warnings for subsystems with data whose own baseline is reliable.
fn decline_warnings(input: &StabilityInput, baseline: &PersonalBaseline) -> Vec<String> {
    Subsystem::ALL
        .into_iter()
        .filter_map(|subsystem| {
            let stability = input.stability_of(subsystem)?;
            let stats = baseline.subsystem(subsystem);
            (stats.is_reliable() && stats.indicates_decline(stability))
                .then(|| MessageTemplates::decline(subsystem))
        })
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::*;
    use crate::baseline::BaselineObservations;
    use crate::signals::{CardiacSignal, CognitiveSignal, PhysicalSignal, SleepSignal};

    fn arb_input() -> impl Strategy<Value = StabilityInput> {
        (
            (any::<bool>(), 0.0..1.0f64, 0.0..1.0f64, 0u32..20),
            (any::<bool>(), 0.0..1.0f64, 30.0..200.0f64, 0.0..150.0f64),
            (any::<bool>(), 3.0..12.0f64, 0.0..3.0f64, 0.0..40.0f64, 0.0..40.0f64, 0.0..1.0f64),
            (any::<bool>(), 0.0..1.0f64, 1.0..5.0f64, -1.0..1.0f64, 0u32..10),
            0i64..600,
        )
            .prop_map(|(p, c, s, g, age_minutes)| {
                let now = Utc::now();
                let at = now - chrono::Duration::minutes(age_minutes);
                let physical = if p.0 {
                    PhysicalSignal::new(p.1, p.2, p.3, at)
                } else {
                    PhysicalSignal::empty()
                };
                let cardiac = if c.0 {
                    CardiacSignal::new(c.1, c.2, c.3, at)
                } else {
                    CardiacSignal::empty()
                };
                let sleep = if s.0 {
                    SleepSignal::new(s.1, s.2, s.3, s.4, s.5, s.5, at)
                } else {
                    SleepSignal::empty()
                };
                let cognitive = if g.0 {
                    CognitiveSignal::new(g.1, g.2, g.3, g.4, at)
                } else {
                    CognitiveSignal::empty()
                };
                StabilityInput::new(physical, cardiac, sleep, cognitive, at)
            })
    }

    fn arb_baseline() -> impl Strategy<Value = PersonalBaseline> {
        proptest::collection::vec(0.0..1.0f64, 0..12).prop_map(|values| {
            let now = Utc::now();
            values.into_iter().fold(
                PersonalBaseline::neutral(Uuid::new_v4(), now),
                |baseline, v| {
                    let obs = BaselineObservations {
                        physical: Some(v),
                        cardiac: Some(1.0 - v),
                        sleep: Some(v * 0.5 + 0.25),
                        cognitive: Some(v),
                        overall: Some(v),
                    };
                    baseline.update_with(&obs, now)
                },
            )
        })
    }

    proptest! {
        /// Score, confidence and trend always stay in range.
        #[test]
        fn outputs_stay_in_range(input in arb_input(), baseline in arb_baseline()) {
            let result = compute_score(&input, &baseline);
            prop_assert!((0.0..=100.0).contains(&result.score), "score {}", result.score);
            prop_assert!((0.0..=1.0).contains(&result.confidence), "confidence {}", result.confidence);
            prop_assert!((-1.0..=1.0).contains(&result.trend), "trend {}", result.trend);
        }

        /// Weights over present subsystems sum to 1.0 whenever a score is produced.
        #[test]
        fn weights_sum_to_one(input in arb_input(), baseline in arb_baseline()) {
            let result = compute_score(&input, &baseline);
            if input.has_minimum_data() {
                let total: f64 = result
                    .contributions
                    .iter()
                    .filter(|c| c.has_data)
                    .map(|c| c.weight)
                    .sum();
                prop_assert!((total - 1.0).abs() < 1e-6, "weight sum {}", total);
            } else {
                prop_assert_eq!(result.score, 0.0);
                prop_assert_eq!(result.warnings.len(), 1);
                prop_assert!(result.contributions.iter().all(|c| !c.has_data));
            }
        }
    }
}
