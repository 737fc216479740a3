use chrono::{DateTime, Duration, Utc};

use crate::baseline::PersonalBaseline;
use crate::models::input::StabilityInput;

/// Confidence budget per term. The terms sum to at most 1.0.
pub mod budget {
    pub const DATA_COVERAGE: f64 = 0.5;
    pub const BASELINE_RELIABILITY: f64 = 0.3;
    pub const RECENCY: f64 = 0.2;
}

/// Results at or above this confidence are reliable.
pub const RELIABLE_CONFIDENCE: f64 = 0.5;

/// Share of the coverage and reliability terms earned per subsystem.
const SUBSYSTEM_COUNT: f64 = 4.0;

/// Recency credit for data of the given age. Future timestamps count as fresh.
pub fn recency_credit(age: Duration) -> f64 {
    let age = age.max(Duration::zero());
    if age < Duration::minutes(5) {
        0.2
    } else if age < Duration::minutes(30) {
        0.15
    } else if age < Duration::hours(1) {
        0.1
    } else if age < Duration::hours(6) {
        0.05
    } else {
        0.0
    }
}

/// Additive confidence: data coverage, baseline maturity and data freshness.
pub fn compute_confidence(
    input: &StabilityInput,
    baseline: &PersonalBaseline,
    now: DateTime<Utc>,
) -> f64 {
    let coverage = (budget::DATA_COVERAGE * input.subsystems_with_data() as f64 / SUBSYSTEM_COUNT)
        .min(budget::DATA_COVERAGE);

    let reliability = if baseline.is_reliable() {
        budget::BASELINE_RELIABILITY
    } else {
        budget::BASELINE_RELIABILITY * baseline.reliable_subsystem_count() as f64 / SUBSYSTEM_COUNT
    }
    .min(budget::BASELINE_RELIABILITY);

    let recency = recency_credit(now.signed_duration_since(input.collected_at)).min(budget::RECENCY);

    (coverage + reliability + recency).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::baseline::BaselineObservations;
    use crate::signals::{CardiacSignal, PhysicalSignal};

    fn two_subsystem_input(collected_at: DateTime<Utc>) -> StabilityInput {
        let mut input = StabilityInput::empty(collected_at);
        input.physical = PhysicalSignal::new(0.1, 0.1, 0, collected_at);
        input.cardiac = CardiacSignal::new(0.1, 70.0, 80.0, collected_at);
        input
    }

    #[test]
    fn recency_bands() {
        assert_eq!(recency_credit(Duration::minutes(1)), 0.2);
        assert_eq!(recency_credit(Duration::minutes(5)), 0.15);
        assert_eq!(recency_credit(Duration::minutes(29)), 0.15);
        assert_eq!(recency_credit(Duration::minutes(45)), 0.1);
        assert_eq!(recency_credit(Duration::hours(5)), 0.05);
        assert_eq!(recency_credit(Duration::hours(6)), 0.0);
        assert_eq!(recency_credit(Duration::minutes(-10)), 0.2);
    }

    #[test]
    fn fresh_partial_data_with_new_baseline() {
        let now = Utc::now();
        let baseline = PersonalBaseline::neutral(Uuid::new_v4(), now);
        // 0.5*2/4 + 0 + 0.2
        let confidence = compute_confidence(&two_subsystem_input(now), &baseline, now);
        assert!((confidence - 0.45).abs() < 1e-9);
    }

    #[test]
    fn partial_reliability_credit() {
        let now = Utc::now();
        let obs = BaselineObservations {
            physical: Some(0.9),
            cardiac: Some(0.9),
            ..Default::default()
        };
        let mut baseline = PersonalBaseline::neutral(Uuid::new_v4(), now);
        for _ in 0..7 {
            baseline = baseline.update_with(&obs, now);
        }
        // 0.25 + 0.3*2/4 + 0.1 (45 minutes old)
        let input = two_subsystem_input(now - Duration::minutes(45));
        let confidence = compute_confidence(&input, &baseline, now);
        assert!((confidence - 0.5).abs() < 1e-9);
    }
}
