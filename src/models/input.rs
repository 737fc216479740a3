use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signals::{CardiacSignal, CognitiveSignal, PhysicalSignal, SleepSignal, SubsystemSignal};

use super::enums::Subsystem;

/// Fewest subsystems with data for which a score is attempted.
pub const MIN_SUBSYSTEMS_WITH_DATA: usize = 2;

/// One snapshot of all four subsystem signals, as assembled by the collectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityInput {
    pub physical: PhysicalSignal,
    pub cardiac: CardiacSignal,
    pub sleep: SleepSignal,
    pub cognitive: CognitiveSignal,
    pub collected_at: DateTime<Utc>,
}

impl StabilityInput {
    pub fn new(
        physical: PhysicalSignal,
        cardiac: CardiacSignal,
        sleep: SleepSignal,
        cognitive: CognitiveSignal,
        collected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            physical,
            cardiac,
            sleep,
            cognitive,
            collected_at,
        }
    }

    /// An input where every collector reported nothing.
    pub fn empty(collected_at: DateTime<Utc>) -> Self {
        Self::new(
            PhysicalSignal::empty(),
            CardiacSignal::empty(),
            SleepSignal::empty(),
            CognitiveSignal::empty(),
            collected_at,
        )
    }

    pub fn has_data(&self, subsystem: Subsystem) -> bool {
        match subsystem {
            Subsystem::Physical => self.physical.has_data(),
            Subsystem::Cardiac => self.cardiac.has_data(),
            Subsystem::Sleep => self.sleep.has_data(),
            Subsystem::Cognitive => self.cognitive.has_data(),
        }
    }

    /// Current stability of a subsystem, `None` when its collector had no data.
    pub fn stability_of(&self, subsystem: Subsystem) -> Option<f64> {
        match subsystem {
            Subsystem::Physical => self.physical.observed_stability(),
            Subsystem::Cardiac => self.cardiac.observed_stability(),
            Subsystem::Sleep => self.sleep.observed_stability(),
            Subsystem::Cognitive => self.cognitive.observed_stability(),
        }
    }

    pub fn subsystems_with_data(&self) -> usize {
        Subsystem::ALL.iter().filter(|s| self.has_data(**s)).count()
    }

    pub fn has_minimum_data(&self) -> bool {
        self.subsystems_with_data() >= MIN_SUBSYSTEMS_WITH_DATA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_data() {
        let input = StabilityInput::empty(Utc::now());
        assert_eq!(input.subsystems_with_data(), 0);
        assert!(!input.has_minimum_data());
        for subsystem in Subsystem::ALL {
            assert!(input.stability_of(subsystem).is_none());
        }
    }

    #[test]
    fn two_subsystems_meet_minimum() {
        let now = Utc::now();
        let mut input = StabilityInput::empty(now);
        input.physical = PhysicalSignal::new(0.1, 0.1, 0, now);
        assert!(!input.has_minimum_data());

        input.cognitive = CognitiveSignal::new(1.0, 4.0, 0.0, 7, now);
        assert_eq!(input.subsystems_with_data(), 2);
        assert!(input.has_minimum_data());
        assert!(input.stability_of(Subsystem::Cognitive).is_some());
        assert!(input.stability_of(Subsystem::Sleep).is_none());
    }
}
