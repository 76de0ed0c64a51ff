//! Builder for constructing stage machines.

use crate::builder::error::BuildError;
use crate::core::{Gate, GateTable, Marker, NoQuestions, QuestionOracle};
use crate::engine::{ComponentState, StageData, StageMachine};
use std::sync::Arc;

/// Builder for constructing stage machines with a fluent API.
///
/// # Example
///
/// ```
/// use hubbleds::builder::StageMachineBuilder;
/// use hubbleds::engine::{Direction, StageMachine};
/// use hubbleds::stages::{DistanceData, DistanceMarker};
///
/// let machine: StageMachine<DistanceMarker, DistanceData> =
///     StageMachineBuilder::new("practice").build().unwrap();
///
/// assert!(machine.can_transition(Direction::Forward));
/// ```
pub struct StageMachineBuilder<M: Marker, D: StageData> {
    stage_id: &'static str,
    initial: Option<ComponentState<M, D>>,
    gates: Vec<(M, Gate<ComponentState<M, D>>)>,
    back_jumps: Vec<(M, M)>,
    oracle: Option<Arc<dyn QuestionOracle>>,
}

impl<M: Marker, D: StageData> StageMachineBuilder<M, D> {
    pub fn new(stage_id: &'static str) -> Self {
        Self {
            stage_id,
            initial: None,
            gates: Vec::new(),
            back_jumps: Vec::new(),
            oracle: None,
        }
    }

    /// Start from a given state instead of the first marker with default data.
    pub fn initial(mut self, state: ComponentState<M, D>) -> Self {
        self.initial = Some(state);
        self
    }

    /// Register a gate guarding entry into `marker`.
    pub fn gate(mut self, marker: M, gate: Gate<ComponentState<M, D>>) -> Self {
        self.gates.push((marker, gate));
        self
    }

    /// Gate `marker` on a pure predicate over the component state.
    pub fn when<F>(self, marker: M, predicate: F) -> Self
    where
        F: Fn(&ComponentState<M, D>) -> bool + Send + Sync + 'static,
    {
        self.gate(marker, Gate::new(predicate))
    }

    /// Gate `marker` on a completed question.
    pub fn question(self, marker: M, question_id: &str) -> Self {
        self.gate(marker, Gate::question(question_id))
    }

    /// Make [`StageMachine::step_back`] from `from` land on `to`.
    pub fn back_jump(mut self, from: M, to: M) -> Self {
        self.back_jumps.push((from, to));
        self
    }

    pub fn oracle(mut self, oracle: Arc<dyn QuestionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Build the stage machine.
    /// Returns an error if the gate or back-jump configuration is inconsistent.
    pub fn build(self) -> Result<StageMachine<M, D>, BuildError> {
        let stage = self.stage_id;
        let mut table = GateTable::new();

        for (marker, gate) in self.gates {
            if marker.is_first() {
                return Err(BuildError::GateOnFirstMarker {
                    stage: stage.to_string(),
                    marker: marker.name().to_string(),
                });
            }
            if gate.is_question() && self.oracle.is_none() {
                return Err(BuildError::MissingOracle {
                    stage: stage.to_string(),
                    marker: marker.name().to_string(),
                });
            }
            if table.insert(marker, gate).is_some() {
                return Err(BuildError::DuplicateGate {
                    stage: stage.to_string(),
                    marker: marker.name().to_string(),
                });
            }
        }

        let mut back_jumps = vec![None; M::SEQUENCE.len()];
        for (from, to) in self.back_jumps {
            if to >= from {
                return Err(BuildError::InvalidBackJump {
                    stage: stage.to_string(),
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                });
            }
            back_jumps[from.ordinal()] = Some(to);
        }

        let oracle = self
            .oracle
            .unwrap_or_else(|| Arc::new(NoQuestions) as Arc<dyn QuestionOracle>);

        Ok(StageMachine::new(
            stage,
            self.initial.unwrap_or_default(),
            table,
            back_jumps,
            oracle,
        ))
    }
}
