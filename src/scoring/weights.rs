use serde::{Deserialize, Serialize};

use crate::baseline::PersonalBaseline;
use crate::models::enums::Subsystem;
use crate::models::input::StabilityInput;

/// One weight per subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubsystemWeights {
    pub physical: f64,
    pub cardiac: f64,
    pub sleep: f64,
    pub cognitive: f64,
}

impl SubsystemWeights {
    pub const DEFAULT: SubsystemWeights = SubsystemWeights {
        physical: 0.30,
        cardiac: 0.30,
        sleep: 0.25,
        cognitive: 0.15,
    };

    pub const ZERO: SubsystemWeights = SubsystemWeights {
        physical: 0.0,
        cardiac: 0.0,
        sleep: 0.0,
        cognitive: 0.0,
    };

    pub fn get(&self, subsystem: Subsystem) -> f64 {
        match subsystem {
            Subsystem::Physical => self.physical,
            Subsystem::Cardiac => self.cardiac,
            Subsystem::Sleep => self.sleep,
            Subsystem::Cognitive => self.cognitive,
        }
    }

    pub fn set(&mut self, subsystem: Subsystem, weight: f64) {
        match subsystem {
            Subsystem::Physical => self.physical = weight,
            Subsystem::Cardiac => self.cardiac = weight,
            Subsystem::Sleep => self.sleep = weight,
            Subsystem::Cognitive => self.cognitive = weight,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subsystem, f64)> + '_ {
        Subsystem::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }

    /// Scale so the weights sum to 1.0. All-zero weights stay zero.
    fn normalized(mut self) -> Self {
        let total = self.total();
        if total > 0.0 {
            for subsystem in Subsystem::ALL {
                self.set(subsystem, self.get(subsystem) / total);
            }
        }
        self
    }
}

impl Default for SubsystemWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Derive this pass's weights from the defaults.
///
/// 1. Subsystems without data get weight 0; their share is split evenly among
///    the subsystems that have data.
/// 2. With a reliable baseline, each subsystem whose current stability is
///    anomalous against its own baseline is multiplied by `anomaly_boost`, and
///    the set is renormalised to 1.0.
pub fn calculate_adaptive_weights(
    defaults: &SubsystemWeights,
    input: &StabilityInput,
    baseline: &PersonalBaseline,
    anomaly_boost: f64,
) -> SubsystemWeights {
    let mut weights = *defaults;

    let present: Vec<Subsystem> = Subsystem::ALL
        .into_iter()
        .filter(|s| input.has_data(*s))
        .collect();

    if present.is_empty() {
        return SubsystemWeights::ZERO;
    }

    let mut zeroed = 0.0;
    for subsystem in Subsystem::ALL {
        if !input.has_data(subsystem) {
            zeroed += weights.get(subsystem);
            weights.set(subsystem, 0.0);
        }
    }

    let additional = zeroed / present.len() as f64;
    for subsystem in &present {
        weights.set(*subsystem, weights.get(*subsystem) + additional);
    }

    if baseline.is_reliable() {
        for subsystem in &present {
            let Some(stability) = input.stability_of(*subsystem) else {
                continue;
            };
            if baseline.subsystem(*subsystem).is_anomalous(stability) {
                tracing::debug!(
                    subsystem = subsystem.as_str(),
                    stability,
                    "Anomalous reading, boosting weight"
                );
                weights.set(*subsystem, weights.get(*subsystem) * anomaly_boost);
            }
        }
        weights = weights.normalized();
    }

    weights
}
