use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::baseline::PersonalBaseline;
use crate::history::{ScoreHistory, StabilityScoreHistoryEntry, DEFAULT_HISTORY_CAPACITY};

use super::{KeyValueStore, StoreError};

const BASELINE_KEY_PREFIX: &str = "stability_baseline:";
const HISTORY_KEY_PREFIX: &str = "stability_history:";

pub fn baseline_key(patient_id: &Uuid) -> String {
    format!("{BASELINE_KEY_PREFIX}{patient_id}")
}

pub fn history_key(patient_id: &Uuid) -> String {
    format!("{HISTORY_KEY_PREFIX}{patient_id}")
}

/// JSON persistence of baselines and score history over a key-value store.
///
/// Loads never fail: a missing, unreadable or malformed record falls back to a
/// neutral baseline or an empty history so scoring can always proceed.
pub struct BaselineRepository<S> {
    store: S,
    history_capacity: usize,
}

impl<S: KeyValueStore> BaselineRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_history_capacity(store, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(store: S, history_capacity: usize) -> Self {
        Self {
            store,
            history_capacity: history_capacity.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_baseline(&self, patient_id: &Uuid, now: DateTime<Utc>) -> PersonalBaseline {
        let key = baseline_key(patient_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PersonalBaseline::neutral(*patient_id, now),
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "Baseline load failed, using neutral baseline");
                return PersonalBaseline::neutral(*patient_id, now);
            }
        };

        match serde_json::from_str::<PersonalBaseline>(&raw) {
            Ok(baseline) if baseline.patient_id == *patient_id => baseline,
            Ok(baseline) => {
                tracing::warn!(
                    patient_id = %patient_id,
                    stored_patient_id = %baseline.patient_id,
                    "Stored baseline belongs to another patient, using neutral baseline"
                );
                PersonalBaseline::neutral(*patient_id, now)
            }
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "Malformed stored baseline, using neutral baseline");
                PersonalBaseline::neutral(*patient_id, now)
            }
        }
    }

    pub fn save_baseline(&self, baseline: &PersonalBaseline) -> Result<(), StoreError> {
        let json = serde_json::to_string(baseline)?;
        self.store.put(&baseline_key(&baseline.patient_id), &json)
    }

    pub fn load_history(&self, patient_id: &Uuid) -> ScoreHistory {
        let empty = || ScoreHistory::new(self.history_capacity);
        let raw = match self.store.get(&history_key(patient_id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return empty(),
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "History load failed, starting empty");
                return empty();
            }
        };

        match serde_json::from_str::<ScoreHistory>(&raw) {
            Ok(mut history) => {
                history.set_capacity(self.history_capacity);
                history
            }
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "Malformed stored history, starting empty");
                empty()
            }
        }
    }

    /// Append an entry, dropping the oldest beyond capacity, and save.
    pub fn append_history(
        &self,
        patient_id: &Uuid,
        entry: StabilityScoreHistoryEntry,
    ) -> Result<ScoreHistory, StoreError> {
        let mut history = self.load_history(patient_id);
        history.push(entry);
        let json = serde_json::to_string(&history)?;
        self.store.put(&history_key(patient_id), &json)?;
        Ok(history)
    }

    /// Forget everything stored for a patient.
    pub fn clear_patient(&self, patient_id: &Uuid) -> Result<(), StoreError> {
        self.store.delete(&baseline_key(patient_id))?;
        self.store.delete(&history_key(patient_id))?;
        tracing::info!(patient_id = %patient_id, "Cleared stored baseline and history");
        Ok(())
    }
}
