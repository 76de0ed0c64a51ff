//! Step history tracking.
//!
//! Records every applied move through a stage, so a session can report the
//! path a student took (including forced skips) and how long it took.

use super::marker::Marker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a move was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Single step forward past a gate.
    Next,
    /// Single step back.
    Previous,
    /// Non-adjacent move whose target gate passed.
    Jump,
    /// Non-adjacent move that bypassed gates.
    Forced,
}

/// Record of a single applied move.
///
/// # Example
///
/// ```rust
/// use hubbleds::core::{StepKind, StepTransition};
/// use hubbleds::stages::DistanceMarker;
/// use chrono::Utc;
///
/// let transition = StepTransition {
///     from: DistanceMarker::DotSeq5,
///     to: DistanceMarker::RepRem1,
///     kind: StepKind::Forced,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.kind, StepKind::Forced);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StepTransition<M: Marker> {
    pub from: M,
    pub to: M,
    pub kind: StepKind,
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of applied moves.
///
/// History is immutable: [`record`](Self::record) returns a new history with
/// the move appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StepHistory<M: Marker> {
    transitions: Vec<StepTransition<M>>,
}

impl<M: Marker> Default for StepHistory<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Marker> StepHistory<M> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a move, returning a new history.
    pub fn record(&self, transition: StepTransition<M>) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    /// Append a move in place.
    pub fn push(&mut self, transition: StepTransition<M>) {
        self.transitions.push(transition);
    }

    /// Markers visited in order: the first move's origin, then every target.
    pub fn get_path(&self) -> Vec<M> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the first and last recorded move.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// Number of moves of the given kind.
    pub fn count(&self, kind: StepKind) -> usize {
        self.transitions.iter().filter(|t| t.kind == kind).count()
    }

    pub fn transitions(&self) -> &[StepTransition<M>] {
        &self.transitions
    }
}
