//! Stage machine that moves a component state through its marker sequence.

use crate::core::{GateTable, Marker, QuestionOracle, StepHistory, StepKind, StepTransition};
use crate::engine::state::{ComponentState, StageData};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Direction of a single-step move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// An applied change of the current step, as delivered to observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepChange<M: Marker> {
    pub from: M,
    pub to: M,
    pub kind: StepKind,
}

/// Callback invoked after the current step changed.
pub type Observer<M> = Box<dyn FnMut(&StepChange<M>) + Send>;

/// Gates of a stage, evaluated against its component state.
pub type StageGates<M, D> = GateTable<M, ComponentState<M, D>>;

/// State machine for one stage of one session.
///
/// Forward moves consult the gate of the marker being entered; backward moves
/// are never gated. A move that is not allowed is a silent no-op: the current
/// step is returned unchanged and observers are not called.
pub struct StageMachine<M: Marker, D: StageData> {
    stage_id: &'static str,
    state: ComponentState<M, D>,
    gates: StageGates<M, D>,
    back_jumps: Vec<Option<M>>,
    oracle: Arc<dyn QuestionOracle>,
    observers: Vec<Observer<M>>,
    history: StepHistory<M>,
    version: u64,
}

impl<M: Marker, D: StageData> StageMachine<M, D> {
    pub(crate) fn new(
        stage_id: &'static str,
        state: ComponentState<M, D>,
        gates: StageGates<M, D>,
        back_jumps: Vec<Option<M>>,
        oracle: Arc<dyn QuestionOracle>,
    ) -> Self {
        Self {
            stage_id,
            state,
            gates,
            back_jumps,
            oracle,
            observers: Vec::new(),
            history: StepHistory::new(),
            version: 0,
        }
    }

    pub fn stage_id(&self) -> &'static str {
        self.stage_id
    }

    pub fn state(&self) -> &ComponentState<M, D> {
        &self.state
    }

    pub fn current_step(&self) -> M {
        self.state.current_step()
    }

    pub fn data(&self) -> &D {
        self.state.data()
    }

    pub fn history(&self) -> &StepHistory<M> {
        &self.history
    }

    /// Monotonic counter bumped by every applied move and data change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_current_step(&self, marker: M) -> bool {
        self.state.is_current_step(marker)
    }

    pub fn current_step_between(&self, low: M, high: M) -> bool {
        self.state.current_step_between(low, high)
    }

    /// Whether a single step in `direction` would be applied.
    pub fn can_transition(&self, direction: Direction) -> bool {
        let current = self.current_step();
        match direction {
            Direction::Forward => current
                .next()
                .is_some_and(|next| self.gate_allows(next)),
            Direction::Backward => !current.is_first(),
        }
    }

    /// Advance one step if the next marker's gate allows it.
    pub fn transition_next(&mut self) -> M {
        let current = self.current_step();
        match current.next() {
            Some(next) if self.gate_allows(next) => self.apply(next, StepKind::Next),
            Some(next) => {
                tracing::debug!(
                    stage = self.stage_id,
                    from = current.name(),
                    to = next.name(),
                    "forward step blocked by gate"
                );
                current
            }
            None => current,
        }
    }

    /// Go back one step. Never gated.
    pub fn transition_previous(&mut self) -> M {
        match self.current_step().previous() {
            Some(previous) => self.apply(previous, StepKind::Previous),
            None => self.current_step(),
        }
    }

    /// Move to any marker of the stage.
    ///
    /// Without `force` the target's gate must pass; with `force` the move is
    /// unconditional. Used for branch skipping.
    pub fn transition_to(&mut self, target: M, force: bool) -> M {
        if force {
            return self.apply(target, StepKind::Forced);
        }
        if self.gate_allows(target) {
            return self.apply(target, StepKind::Jump);
        }
        tracing::debug!(
            stage = self.stage_id,
            from = self.current_step().name(),
            to = target.name(),
            "jump blocked by gate"
        );
        self.current_step()
    }

    /// Go back, following the stage's back jump for the current marker if one
    /// is registered.
    pub fn step_back(&mut self) -> M {
        match self.back_jumps[self.current_step().ordinal()] {
            Some(target) => self.apply(target, StepKind::Previous),
            None => self.transition_previous(),
        }
    }

    /// Register a step-change observer. Observers run in registration order.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&StepChange<M>) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Mutate stage data. Counts as a change for persistence.
    pub fn modify<R>(&mut self, update: impl FnOnce(&mut D) -> R) -> R {
        let result = update(self.state.data_mut());
        self.version += 1;
        result
    }

    /// Like [`modify`](Self::modify), but only counts as a change on success.
    pub fn try_modify<T, E>(
        &mut self,
        update: impl FnOnce(&mut D) -> Result<T, E>,
    ) -> Result<T, E> {
        let result = update(self.state.data_mut())?;
        self.version += 1;
        Ok(result)
    }

    /// Replace the whole component state with one loaded from storage.
    ///
    /// Observers are not notified and no history is recorded.
    pub fn restore(&mut self, state: ComponentState<M, D>) {
        self.state = state;
        self.version += 1;
    }

    fn gate_allows(&self, marker: M) -> bool {
        self.gates.allows(marker, &self.state, self.oracle.as_ref())
    }

    fn apply(&mut self, to: M, kind: StepKind) -> M {
        let from = self.current_step();
        if from == to {
            return from;
        }

        self.state.set_step(to);
        self.version += 1;
        self.history.push(StepTransition {
            from,
            to,
            kind,
            timestamp: Utc::now(),
        });
        tracing::debug!(
            stage = self.stage_id,
            from = from.name(),
            to = to.name(),
            kind = ?kind,
            "step changed"
        );

        let change = StepChange { from, to, kind };
        for observer in &mut self.observers {
            observer(&change);
        }
        to
    }
}

impl<M: Marker, D: StageData> fmt::Debug for StageMachine<M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageMachine")
            .field("stage_id", &self.stage_id)
            .field("state", &self.state)
            .field("gates", &self.gates.len())
            .field("observers", &self.observers.len())
            .field("version", &self.version)
            .finish()
    }
}
