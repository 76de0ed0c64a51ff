//! Load-on-entry and save-on-change for one stage machine.
//!
//! The adapter builds effects and the caller runs them against a
//! [`SyncEnv`]; results are fed back through
//! [`apply_loaded`](SyncAdapter::apply_loaded) and
//! [`complete_save`](SyncAdapter::complete_save). All store I/O stays inside
//! the effects.

use crate::core::{Dataset, Marker, Measurement};
use crate::engine::{StageData, StageMachine};
use crate::sync::error::SyncError;
use crate::sync::snapshot::StageSnapshot;
use crate::sync::store::{PutOutcome, StageKey, StateStore};
use crate::validation::{DataRules, Violation, ViolationStrategy};
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use stillwater::validation::Validation;

/// Environment the sync effects run against.
#[derive(Clone)]
pub struct SyncEnv {
    pub store: Arc<dyn StateStore>,
}

impl SyncEnv {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

/// What a completed load did to the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet; the machine keeps its initial state.
    Fresh,
    Restored { revision: u64 },
}

/// Result of a save effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveReceipt {
    pub revision: u64,
    /// Machine version the saved snapshot was taken at.
    pub machine_version: u64,
    pub outcome: PutOutcome,
}

/// Tracks load/save state for one stage of one session.
pub struct SyncAdapter<D: StageData> {
    key: StageKey,
    rules: DataRules<D>,
    read_only: bool,
    loaded: bool,
    revision: u64,
    dispatched_version: Option<u64>,
    saved_version: Option<u64>,
}

impl<D: StageData> SyncAdapter<D> {
    pub fn new(key: StageKey) -> Self {
        Self::with_rules(key, DataRules::default())
    }

    pub fn with_rules(key: StageKey, rules: DataRules<D>) -> Self {
        Self {
            key,
            rules,
            read_only: false,
            loaded: false,
            revision: 0,
            dispatched_version: None,
            saved_version: None,
        }
    }

    /// Never dispatch saves. Loading still works.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn key(&self) -> &StageKey {
        &self.key
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn saved_version(&self) -> Option<u64> {
        self.saved_version
    }

    /// Effect fetching the stored snapshot for this stage, if any.
    pub fn load(&self) -> BoxedEffect<Option<StageSnapshot>, SyncError, SyncEnv> {
        let key = self.key.clone();
        from_fn(move |env: &SyncEnv| -> Result<_, SyncError> {
            Ok(env.store.get_stage_state(&key)?)
        })
        .boxed()
    }

    /// Apply a loaded snapshot to `machine` and open the save gate.
    ///
    /// A snapshot that fails validation is rejected under
    /// [`ViolationStrategy::Reject`]; the machine is left untouched and saves
    /// stay disabled so the stored state is not overwritten.
    pub fn apply_loaded<M: Marker>(
        &mut self,
        machine: &mut StageMachine<M, D>,
        loaded: Option<StageSnapshot>,
    ) -> Result<LoadOutcome, SyncError> {
        let Some(snapshot) = loaded else {
            self.loaded = true;
            tracing::info!(key = %self.key, "no stored state, starting fresh");
            return Ok(LoadOutcome::Fresh);
        };

        let state = snapshot.restore::<M, D>(machine.stage_id())?;

        if let Validation::Failure(errors) = self.rules.enforce(state.data()) {
            let violations: Vec<Violation> = errors.iter().cloned().collect();
            for violation in &violations {
                tracing::warn!(key = %self.key, %violation, "stored state violation");
            }
            if self.rules.violation_strategy() == ViolationStrategy::Reject {
                return Err(SyncError::InvalidState {
                    stage: machine.stage_id().to_string(),
                    violations,
                });
            }
        }

        machine.restore(state);
        self.loaded = true;
        self.revision = self.revision.max(snapshot.revision);
        self.saved_version = Some(machine.version());
        self.dispatched_version = self.saved_version;

        tracing::info!(
            key = %self.key,
            revision = snapshot.revision,
            step = machine.current_step().name(),
            "stage state restored"
        );
        Ok(LoadOutcome::Restored {
            revision: snapshot.revision,
        })
    }

    /// Effect saving the machine's current state, or `None` when there is
    /// nothing to do: not loaded yet, read-only, or unchanged since the last
    /// dispatched save.
    ///
    /// Each dispatched save takes the next session revision, so if several
    /// are in flight the store keeps the one dispatched last.
    pub fn save<M: Marker>(
        &mut self,
        machine: &StageMachine<M, D>,
    ) -> Option<BoxedEffect<SaveReceipt, SyncError, SyncEnv>> {
        if !self.loaded {
            tracing::debug!(key = %self.key, "save skipped before load");
            return None;
        }
        if self.read_only {
            tracing::debug!(key = %self.key, "save skipped, read-only session");
            return None;
        }
        let machine_version = machine.version();
        if self.dispatched_version == Some(machine_version) {
            return None;
        }

        self.revision += 1;
        self.dispatched_version = Some(machine_version);
        let revision = self.revision;

        let snapshot = match StageSnapshot::capture(machine.stage_id(), revision, machine.state()) {
            Ok(snapshot) => snapshot,
            Err(e) => return Some(fail(SyncError::from(e)).boxed()),
        };
        let (student, sample) = measurement_rows(machine.data());
        let key = self.key.clone();

        tracing::debug!(key = %self.key, revision, machine_version, "save dispatched");

        Some(
            from_fn(move |env: &SyncEnv| -> Result<_, SyncError> {
                let outcome = env.store.put_stage_state(&key, &snapshot)?;
                if let Some(rows) = &student {
                    env.store.put_measurements(&key, revision, rows)?;
                }
                if let Some(rows) = &sample {
                    env.store.put_sample_measurements(&key, revision, rows)?;
                }
                Ok(SaveReceipt {
                    revision,
                    machine_version,
                    outcome,
                })
            })
            .boxed(),
        )
    }

    /// Record the result of a save effect.
    ///
    /// A failed save is forgotten so the next [`save`](Self::save) retries.
    pub fn complete_save(&mut self, result: &Result<SaveReceipt, SyncError>) {
        match result {
            Ok(receipt) => match receipt.outcome {
                PutOutcome::Written => {
                    let newest = self
                        .saved_version
                        .map_or(receipt.machine_version, |v| v.max(receipt.machine_version));
                    self.saved_version = Some(newest);
                }
                PutOutcome::Stale { stored_revision } => {
                    tracing::debug!(
                        key = %self.key,
                        revision = receipt.revision,
                        stored_revision,
                        "save superseded"
                    );
                }
            },
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "save failed");
                self.dispatched_version = None;
            }
        }
    }
}

fn measurement_rows<D: StageData>(
    data: &D,
) -> (Option<Vec<Measurement>>, Option<Vec<Measurement>>) {
    let mut student = None;
    let mut sample = None;
    for set in data.measurement_sets() {
        let rows = Some(set.as_slice().to_vec());
        match set.dataset() {
            Dataset::Student => student = rows,
            Dataset::Example => sample = rows,
        }
    }
    (student, sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Stage;
    use crate::core::{GalaxyData, NoQuestions, QuestionOracle};
    use crate::engine::ComponentState;
    use crate::stages::{DistanceData, DistanceMarker, DistanceStage};
    use crate::sync::store::MemoryStore;
    use stillwater::prelude::*;

    fn key() -> StageKey {
        StageKey::new("student-1", "class-a", DistanceStage::ID)
    }

    fn machine() -> StageMachine<DistanceMarker, DistanceData> {
        DistanceStage::machine(Arc::new(NoQuestions) as Arc<dyn QuestionOracle>).unwrap()
    }

    fn galaxy(id: &str) -> GalaxyData {
        GalaxyData {
            id: id.to_string(),
            name: id.to_string(),
            ra: 10.0,
            decl: -5.0,
            z: 0.03,
            rest_wave: 6565.0,
            element: "H-α".to_string(),
            spectrum: Vec::new(),
        }
    }

    #[test]
    fn save_before_load_is_skipped() {
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();
        machine.ruler_clicked();

        assert!(adapter.save(&machine).is_none());
        assert_eq!(adapter.revision(), 0);
    }

    #[tokio::test]
    async fn fresh_load_then_save_writes_state_and_rows() {
        let store = Arc::new(MemoryStore::new());
        let env = SyncEnv::new(store.clone());
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();

        let loaded = adapter.load().run(&env).await.unwrap();
        assert_eq!(adapter.apply_loaded(&mut machine, loaded).unwrap(), LoadOutcome::Fresh);

        machine.select_galaxy(Dataset::Student, galaxy("G1"));
        let result = adapter.save(&machine).unwrap().run(&env).await;
        adapter.complete_save(&result);

        let receipt = result.unwrap();
        assert_eq!(receipt.outcome, PutOutcome::Written);
        assert_eq!(adapter.saved_version(), Some(machine.version()));
        assert_eq!(store.stage_revision(&key()), Some(1));
        assert_eq!(store.measurements(&key()).map(|rows| rows.len()), Some(1));
        assert_eq!(store.sample_measurements(&key()), Some(Vec::new()));
    }

    #[tokio::test]
    async fn unchanged_machine_is_not_saved_twice() {
        let env = SyncEnv::new(Arc::new(MemoryStore::new()));
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();
        adapter.apply_loaded(&mut machine, None).unwrap();

        let result = adapter.save(&machine).unwrap().run(&env).await;
        adapter.complete_save(&result);

        assert!(adapter.save(&machine).is_none());
    }

    #[tokio::test]
    async fn last_dispatched_save_wins() {
        let store = Arc::new(MemoryStore::new());
        let env = SyncEnv::new(store.clone());
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();
        adapter.apply_loaded(&mut machine, None).unwrap();

        machine.ruler_clicked();
        let first = adapter.save(&machine).unwrap();
        machine.transition_to(DistanceMarker::AngSiz3, true);
        let second = adapter.save(&machine).unwrap();

        let second_result = second.run(&env).await;
        let first_result = first.run(&env).await;
        adapter.complete_save(&second_result);
        adapter.complete_save(&first_result);

        assert_eq!(second_result.unwrap().outcome, PutOutcome::Written);
        assert_eq!(
            first_result.unwrap().outcome,
            PutOutcome::Stale { stored_revision: 2 }
        );

        let stored = store.get_stage_state(&key()).unwrap().unwrap();
        let state: ComponentState<DistanceMarker, DistanceData> =
            stored.restore(DistanceStage::ID).unwrap();
        assert_eq!(state.current_step(), DistanceMarker::AngSiz3);
        assert_eq!(adapter.saved_version(), Some(machine.version()));
    }

    #[tokio::test]
    async fn read_only_adapter_never_saves() {
        let env = SyncEnv::new(Arc::new(MemoryStore::new()));
        let mut adapter = SyncAdapter::new(key()).read_only(true);
        let mut machine = machine();

        let loaded = adapter.load().run(&env).await.unwrap();
        adapter.apply_loaded(&mut machine, loaded).unwrap();
        machine.ruler_clicked();

        assert!(adapter.is_loaded());
        assert!(adapter.save(&machine).is_none());
    }

    #[test]
    fn loaded_snapshot_restores_machine() {
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();
        let mut data = DistanceData::default();
        data.select_galaxy(Dataset::Example, galaxy("E1"));
        let stored = ComponentState::new(DistanceMarker::AngSiz2, data);
        let snapshot = StageSnapshot::capture(DistanceStage::ID, 7, &stored).unwrap();

        let outcome = adapter.apply_loaded(&mut machine, Some(snapshot)).unwrap();

        assert_eq!(outcome, LoadOutcome::Restored { revision: 7 });
        assert_eq!(machine.state(), &stored);
        assert_eq!(adapter.revision(), 7);
        assert!(adapter.save(&machine).is_none());
    }

    #[test]
    fn inconsistent_snapshot_is_rejected_and_keeps_save_gate_closed() {
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();
        let stored = ComponentState::new(DistanceMarker::AngSiz2, DistanceData::default());
        let mut snapshot = StageSnapshot::capture(DistanceStage::ID, 3, &stored).unwrap();
        snapshot.state["data"]["selected_example_galaxy"] =
            serde_json::to_value(galaxy("E404")).unwrap();

        let err = adapter.apply_loaded(&mut machine, Some(snapshot)).unwrap_err();

        assert!(matches!(
            err,
            SyncError::InvalidState { ref violations, .. } if violations.len() == 1
        ));
        assert_eq!(machine.current_step(), DistanceMarker::AngSiz1);
        assert!(!adapter.is_loaded());
        assert!(adapter.save(&machine).is_none());
    }

    #[test]
    fn ignore_strategy_applies_inconsistent_snapshot() {
        use crate::validation::RulesBuilder;

        let rules = RulesBuilder::new()
            .on_violation(ViolationStrategy::IgnoreAndLog)
            .build();
        let mut adapter = SyncAdapter::with_rules(key(), rules);
        let mut machine = machine();
        let stored = ComponentState::new(DistanceMarker::ChoRow1, DistanceData::default());
        let mut snapshot = StageSnapshot::capture(DistanceStage::ID, 1, &stored).unwrap();
        snapshot.state["data"]["selected_galaxy"] = serde_json::to_value(galaxy("G9")).unwrap();

        let outcome = adapter.apply_loaded(&mut machine, Some(snapshot)).unwrap();

        assert_eq!(outcome, LoadOutcome::Restored { revision: 1 });
        assert_eq!(machine.current_step(), DistanceMarker::ChoRow1);
    }

    #[tokio::test]
    async fn failed_save_is_retried() {
        struct Offline;

        impl StateStore for Offline {
            fn get_stage_state(
                &self,
                _key: &StageKey,
            ) -> Result<Option<StageSnapshot>, crate::sync::StoreError> {
                Ok(None)
            }

            fn put_stage_state(
                &self,
                _key: &StageKey,
                _snapshot: &StageSnapshot,
            ) -> Result<PutOutcome, crate::sync::StoreError> {
                Err(crate::sync::StoreError::Unavailable("offline".to_string()))
            }

            fn put_measurements(
                &self,
                _key: &StageKey,
                _revision: u64,
                _measurements: &[Measurement],
            ) -> Result<PutOutcome, crate::sync::StoreError> {
                Ok(PutOutcome::Written)
            }

            fn put_sample_measurements(
                &self,
                _key: &StageKey,
                _revision: u64,
                _measurements: &[Measurement],
            ) -> Result<PutOutcome, crate::sync::StoreError> {
                Ok(PutOutcome::Written)
            }
        }

        let env = SyncEnv::new(Arc::new(Offline));
        let mut adapter = SyncAdapter::new(key());
        let mut machine = machine();
        adapter.apply_loaded(&mut machine, None).unwrap();

        let result = adapter.save(&machine).unwrap().run(&env).await;
        assert!(matches!(result, Err(SyncError::Store(_))));
        adapter.complete_save(&result);

        assert!(adapter.save(&machine).is_some());
        assert_eq!(adapter.saved_version(), None);
    }
}
