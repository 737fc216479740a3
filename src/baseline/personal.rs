use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::Subsystem;

use super::subsystem::SubsystemBaseline;

/// One observation per subsystem (when it had data) plus the composite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineObservations {
    pub physical: Option<f64>,
    pub cardiac: Option<f64>,
    pub sleep: Option<f64>,
    pub cognitive: Option<f64>,
    /// Composite score on the 0-1 scale.
    pub overall: Option<f64>,
}

impl BaselineObservations {
    pub fn get(&self, subsystem: Subsystem) -> Option<f64> {
        match subsystem {
            Subsystem::Physical => self.physical,
            Subsystem::Cardiac => self.cardiac,
            Subsystem::Sleep => self.sleep,
            Subsystem::Cognitive => self.cognitive,
        }
    }

    pub fn set(&mut self, subsystem: Subsystem, value: Option<f64>) {
        match subsystem {
            Subsystem::Physical => self.physical = value,
            Subsystem::Cardiac => self.cardiac = value,
            Subsystem::Sleep => self.sleep = value,
            Subsystem::Cognitive => self.cognitive = value,
        }
    }
}

/// Per-patient adaptive baseline across all subsystems and the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalBaseline {
    pub patient_id: Uuid,
    pub physical: SubsystemBaseline,
    pub cardiac: SubsystemBaseline,
    pub sleep: SubsystemBaseline,
    pub cognitive: SubsystemBaseline,
    pub overall: SubsystemBaseline,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl PersonalBaseline {
    pub fn neutral(patient_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            patient_id,
            physical: SubsystemBaseline::neutral(),
            cardiac: SubsystemBaseline::neutral(),
            sleep: SubsystemBaseline::neutral(),
            cognitive: SubsystemBaseline::neutral(),
            overall: SubsystemBaseline::neutral(),
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn subsystem(&self, subsystem: Subsystem) -> &SubsystemBaseline {
        match subsystem {
            Subsystem::Physical => &self.physical,
            Subsystem::Cardiac => &self.cardiac,
            Subsystem::Sleep => &self.sleep,
            Subsystem::Cognitive => &self.cognitive,
        }
    }

    /// Reliable once every subsystem baseline is. The composite is not considered.
    pub fn is_reliable(&self) -> bool {
        Subsystem::ALL.iter().all(|s| self.subsystem(*s).is_reliable())
    }

    pub fn reliable_subsystem_count(&self) -> usize {
        Subsystem::ALL
            .iter()
            .filter(|s| self.subsystem(**s).is_reliable())
            .count()
    }

    /// Return the baseline with each present observation folded in.
    /// Absent observations leave that baseline untouched.
    #[must_use]
    pub fn update_with(&self, observations: &BaselineObservations, at: DateTime<Utc>) -> Self {
        let fold = |baseline: &SubsystemBaseline, value: Option<f64>| match value {
            Some(v) => baseline.add_observation(v, at),
            None => baseline.clone(),
        };

        Self {
            patient_id: self.patient_id,
            physical: fold(&self.physical, observations.physical),
            cardiac: fold(&self.cardiac, observations.cardiac),
            sleep: fold(&self.sleep, observations.sleep),
            cognitive: fold(&self.cognitive, observations.cognitive),
            overall: fold(&self.overall, observations.overall),
            created_at: self.created_at,
            last_updated_at: at,
        }
    }
}
