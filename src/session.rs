//! One stage of one student's session: the machine plus its persistence.

use crate::builder::{BuildError, Stage};
use crate::config::StoryConfig;
use crate::core::QuestionOracle;
use crate::engine::{StageData, StageMachine};
use crate::sync::{
    DataCollection, LoadOutcome, SaveReceipt, StageKey, SyncAdapter, SyncEnv, SyncError,
};
use std::sync::Arc;
use stillwater::prelude::*;

/// Drives load-on-mount and save-on-change for a stage.
///
/// # Example
///
/// ```
/// use hubbleds::config::StoryConfig;
/// use hubbleds::quiz::QuizLog;
/// use hubbleds::session::StageSession;
/// use hubbleds::stages::{DistanceMarker, DistanceStage};
/// use hubbleds::sync::{MemoryStore, SyncEnv};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = StoryConfig { update_db: true, ..StoryConfig::default() };
/// let env = SyncEnv::new(Arc::new(MemoryStore::new()));
/// let mut session =
///     StageSession::<DistanceStage>::new("student-1", &config, Arc::new(QuizLog::new()), env)
///         .unwrap();
///
/// session.mount().await.unwrap();
/// session.machine_mut().transition_next();
/// let receipt = session.flush().await.unwrap();
///
/// assert_eq!(session.machine().current_step(), DistanceMarker::ChoRow1);
/// assert!(receipt.is_some());
/// # }
/// ```
pub struct StageSession<S: Stage> {
    machine: StageMachine<S::Marker, S::Data>,
    adapter: SyncAdapter<S::Data>,
    env: SyncEnv,
    collection: Option<DataCollection>,
    collected_version: u64,
}

impl<S: Stage> StageSession<S> {
    /// A session at the stage's first marker. Saves are disabled unless
    /// `config` persists.
    pub fn new(
        student_id: &str,
        config: &StoryConfig,
        oracle: Arc<dyn QuestionOracle>,
        env: SyncEnv,
    ) -> Result<Self, BuildError> {
        let machine = S::machine_with_config(config, oracle)?;
        let key = StageKey::new(student_id, config.class_code.clone(), S::ID);
        let adapter = SyncAdapter::new(key).read_only(!config.persists());
        Ok(Self::from_parts(machine, adapter, env))
    }

    pub fn from_parts(
        machine: StageMachine<S::Marker, S::Data>,
        adapter: SyncAdapter<S::Data>,
        env: SyncEnv,
    ) -> Self {
        Self {
            machine,
            adapter,
            env,
            collection: None,
            collected_version: 0,
        }
    }

    pub fn machine(&self) -> &StageMachine<S::Marker, S::Data> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut StageMachine<S::Marker, S::Data> {
        &mut self.machine
    }

    pub fn adapter(&self) -> &SyncAdapter<S::Data> {
        &self.adapter
    }

    /// Plotting datasets mirroring the stage's measurement sets. Built on the
    /// first successful mount.
    pub fn collection(&self) -> Option<&DataCollection> {
        self.collection.as_ref()
    }

    /// Load stored state into the machine. Saves are skipped until this
    /// succeeds.
    pub async fn mount(&mut self) -> Result<LoadOutcome, SyncError> {
        let loaded = self.adapter.load().run(&self.env).await?;
        let outcome = self.adapter.apply_loaded(&mut self.machine, loaded)?;
        if self.collection.is_some() {
            self.refresh_collection();
        } else {
            self.collection = Some(DataCollection::from_sets(
                self.machine.data().measurement_sets(),
            ));
            self.collected_version = self.machine.version();
        }
        Ok(outcome)
    }

    /// Refresh the plotting datasets, then save the machine if it changed
    /// since the last dispatched save.
    pub async fn flush(&mut self) -> Result<Option<SaveReceipt>, SyncError> {
        self.refresh_collection();
        let Some(effect) = self.adapter.save(&self.machine) else {
            return Ok(None);
        };
        let result = effect.run(&self.env).await;
        self.adapter.complete_save(&result);
        result.map(Some)
    }

    /// Apply `update` to the machine, then flush.
    pub async fn update<R>(
        &mut self,
        update: impl FnOnce(&mut StageMachine<S::Marker, S::Data>) -> R,
    ) -> Result<R, SyncError> {
        let output = update(&mut self.machine);
        self.flush().await?;
        Ok(output)
    }

    fn refresh_collection(&mut self) {
        let version = self.machine.version();
        let Some(collection) = &mut self.collection else {
            return;
        };
        if version == self.collected_version {
            return;
        }
        for set in self.machine.data().measurement_sets() {
            collection.refresh_from(set);
        }
        self.collected_version = version;
    }
}
