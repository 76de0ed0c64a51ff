//! Persistence boundary for stage state and measurements.

use crate::core::Measurement;
use crate::sync::error::StoreError;
use crate::sync::snapshot::StageSnapshot;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Identifies one stage of one student's session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StageKey {
    pub student_id: String,
    pub class_code: String,
    pub stage_id: String,
}

impl StageKey {
    pub fn new(
        student_id: impl Into<String>,
        class_code: impl Into<String>,
        stage_id: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            class_code: class_code.into(),
            stage_id: stage_id.into(),
        }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.class_code, self.student_id, self.stage_id)
    }
}

/// Result of an upsert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    Written,
    /// A write with the same or a newer revision was already stored.
    Stale { stored_revision: u64 },
}

/// Remote state API.
///
/// Every put is an upsert that carries the session revision it was
/// dispatched with. Implementations must drop writes whose revision is not
/// newer than what they hold.
pub trait StateStore: Send + Sync {
    fn get_stage_state(&self, key: &StageKey) -> Result<Option<StageSnapshot>, StoreError>;

    fn put_stage_state(
        &self,
        key: &StageKey,
        snapshot: &StageSnapshot,
    ) -> Result<PutOutcome, StoreError>;

    /// Upsert the student's own measurements.
    fn put_measurements(
        &self,
        key: &StageKey,
        revision: u64,
        measurements: &[Measurement],
    ) -> Result<PutOutcome, StoreError>;

    /// Upsert the example (sample) measurements.
    fn put_sample_measurements(
        &self,
        key: &StageKey,
        revision: u64,
        measurements: &[Measurement],
    ) -> Result<PutOutcome, StoreError>;
}

#[derive(Default)]
struct Tables {
    stage_states: HashMap<StageKey, StageSnapshot>,
    measurements: HashMap<StageKey, (u64, Vec<Measurement>)>,
    sample_measurements: HashMap<StageKey, (u64, Vec<Measurement>)>,
}

/// In-process [`StateStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measurements(&self, key: &StageKey) -> Option<Vec<Measurement>> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.measurements.get(key).map(|(_, rows)| rows.clone())
    }

    pub fn sample_measurements(&self, key: &StageKey) -> Option<Vec<Measurement>> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.sample_measurements.get(key).map(|(_, rows)| rows.clone())
    }

    /// Revision of the stored stage state, if any.
    pub fn stage_revision(&self, key: &StageKey) -> Option<u64> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.stage_states.get(key).map(|s| s.revision)
    }
}

fn upsert_rows(
    table: &mut HashMap<StageKey, (u64, Vec<Measurement>)>,
    key: &StageKey,
    revision: u64,
    rows: &[Measurement],
) -> PutOutcome {
    if let Some((stored_revision, _)) = table.get(key) {
        if *stored_revision >= revision {
            return PutOutcome::Stale {
                stored_revision: *stored_revision,
            };
        }
    }
    table.insert(key.clone(), (revision, rows.to_vec()));
    PutOutcome::Written
}

impl StateStore for MemoryStore {
    fn get_stage_state(&self, key: &StageKey) -> Result<Option<StageSnapshot>, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.stage_states.get(key).cloned())
    }

    fn put_stage_state(
        &self,
        key: &StageKey,
        snapshot: &StageSnapshot,
    ) -> Result<PutOutcome, StoreError> {
        if snapshot.stage_id != key.stage_id {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: format!("snapshot is for stage '{}'", snapshot.stage_id),
            });
        }

        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stored) = tables.stage_states.get(key) {
            if stored.revision >= snapshot.revision {
                tracing::warn!(
                    key = %key,
                    revision = snapshot.revision,
                    stored_revision = stored.revision,
                    "dropping stale stage state write"
                );
                return Ok(PutOutcome::Stale {
                    stored_revision: stored.revision,
                });
            }
        }
        tables.stage_states.insert(key.clone(), snapshot.clone());
        Ok(PutOutcome::Written)
    }

    fn put_measurements(
        &self,
        key: &StageKey,
        revision: u64,
        measurements: &[Measurement],
    ) -> Result<PutOutcome, StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(upsert_rows(&mut tables.measurements, key, revision, measurements))
    }

    fn put_sample_measurements(
        &self,
        key: &StageKey,
        revision: u64,
        measurements: &[Measurement],
    ) -> Result<PutOutcome, StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(upsert_rows(
            &mut tables.sample_measurements,
            key,
            revision,
            measurements,
        ))
    }
}
