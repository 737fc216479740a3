//! Load → score → update → save pipeline per patient.
//!
//! Calls for the same patient are serialised by a per-patient mutex so that
//! concurrent passes never lose a baseline update. Different patients never
//! block each other beyond the brief lock-table lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::baseline::{BaselineObservations, PersonalBaseline};
use crate::config::{self, ConfigError, ScoringConfig};
use crate::history::{ScoreHistory, StabilityScoreHistoryEntry};
use crate::models::enums::Subsystem;
use crate::models::input::StabilityInput;
use crate::scoring::engine::StabilityEngine;
use crate::scoring::types::StabilityScoreResult;
use crate::store::{BaselineRepository, KeyValueStore, SqliteStore, StoreError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid scoring configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Patient lock poisoned")]
    LockFailed,
}

/// Everything one scoring pass produced.
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub result: StabilityScoreResult,
    /// Baseline after this pass. Unchanged when there was too little data.
    pub baseline: PersonalBaseline,
    /// None when there was too little data to record.
    pub history_entry: Option<StabilityScoreHistoryEntry>,
}

type PatientLock = Arc<Mutex<()>>;

pub struct StabilityService<S> {
    engine: StabilityEngine,
    repository: BaselineRepository<S>,
    patient_locks: Mutex<HashMap<Uuid, PatientLock>>,
}

impl StabilityService<SqliteStore> {
    /// Service over the on-disk store in the data directory, tuned from the environment.
    pub fn open_default() -> Result<Self, ServiceError> {
        let store = SqliteStore::open(&config::database_path())?;
        Self::new(store, ScoringConfig::from_env())
    }
}

impl<S: KeyValueStore> StabilityService<S> {
    /// Fails when the configuration does not validate.
    pub fn new(store: S, config: ScoringConfig) -> Result<Self, ServiceError> {
        let repository = BaselineRepository::with_history_capacity(store, config.history_capacity);
        Ok(Self {
            engine: StabilityEngine::new(config)?,
            repository,
            patient_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn engine(&self) -> &StabilityEngine {
        &self.engine
    }

    pub fn repository(&self) -> &BaselineRepository<S> {
        &self.repository
    }

    pub fn score_patient(
        &self,
        patient_id: Uuid,
        input: &StabilityInput,
    ) -> Result<ScoringOutcome, ServiceError> {
        self.score_patient_at(patient_id, input, Utc::now())
    }

    /// Score one input for a patient and persist the updated baseline and history.
    pub fn score_patient_at(
        &self,
        patient_id: Uuid,
        input: &StabilityInput,
        now: DateTime<Utc>,
    ) -> Result<ScoringOutcome, ServiceError> {
        let start = Instant::now();

        self.with_patient_lock(patient_id, || {
            let baseline = self.repository.load_baseline(&patient_id, now);
            let result = self.engine.compute_score_at(input, &baseline, now);

            if !input.has_minimum_data() {
                tracing::info!(
                    patient_id = %patient_id,
                    subsystems_with_data = input.subsystems_with_data(),
                    "Insufficient data, baseline and history left unchanged"
                );
                return Ok(ScoringOutcome {
                    result,
                    baseline,
                    history_entry: None,
                });
            }

            let updated = baseline.update_with(&observations(input, &result), now);
            self.repository.save_baseline(&updated)?;

            let entry = StabilityScoreHistoryEntry::from_result(&result);
            if let Err(e) = self.repository.append_history(&patient_id, entry.clone()) {
                // Keep the stored baseline in step with the stored history.
                if let Err(restore) = self.repository.save_baseline(&baseline) {
                    tracing::error!(
                        patient_id = %patient_id,
                        error = %restore,
                        "Failed to restore baseline after history write failure"
                    );
                }
                return Err(e.into());
            }

            tracing::info!(
                patient_id = %patient_id,
                score = result.score,
                level = result.level.as_str(),
                confidence = result.confidence,
                detractors = result.detractors.len(),
                warnings = result.warnings.len(),
                processing_ms = start.elapsed().as_millis() as u64,
                "Stability score computed"
            );

            Ok(ScoringOutcome {
                result,
                baseline: updated,
                history_entry: Some(entry),
            })
        })
    }

    pub fn history(&self, patient_id: Uuid) -> ScoreHistory {
        self.repository.load_history(&patient_id)
    }

    pub fn baseline(&self, patient_id: Uuid) -> PersonalBaseline {
        self.repository.load_baseline(&patient_id, Utc::now())
    }

    /// Drop the stored baseline and history; the next pass starts neutral.
    pub fn reset_patient(&self, patient_id: Uuid) -> Result<(), ServiceError> {
        self.with_patient_lock(patient_id, || {
            self.repository.clear_patient(&patient_id)?;
            Ok(())
        })
    }

    /// Run `f` while holding the patient's lock. The lock entry is removed
    /// once no other caller holds or waits on it.
    fn with_patient_lock<T>(
        &self,
        patient_id: Uuid,
        f: impl FnOnce() -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let lock = {
            let mut locks = self
                .patient_locks
                .lock()
                .map_err(|_| ServiceError::LockFailed)?;
            Arc::clone(locks.entry(patient_id).or_default())
        };

        let outcome = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(ServiceError::LockFailed),
        };

        let mut locks = self
            .patient_locks
            .lock()
            .map_err(|_| ServiceError::LockFailed)?;
        // Only the table and this caller reference it.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&patient_id);
        }

        outcome
    }

    #[cfg(test)]
    fn tracked_patient_locks(&self) -> usize {
        self.patient_locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Baseline observations for a scored pass: stability for subsystems with
/// data and the composite on the 0-1 scale.
fn observations(input: &StabilityInput, result: &StabilityScoreResult) -> BaselineObservations {
    let mut observations = BaselineObservations {
        overall: Some(result.score / 100.0),
        ..Default::default()
    };
    for subsystem in Subsystem::ALL {
        observations.set(subsystem, input.stability_of(subsystem));
    }
    observations
}
