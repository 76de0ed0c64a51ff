//! Gate predicates that control forward progress.
//!
//! A gate guards entry into one marker. Gates are only consulted when moving
//! forward; stepping back is never blocked.

use super::marker::Marker;
use std::fmt;

/// The quiz subsystem, as seen by gates.
pub trait QuestionOracle: Send + Sync {
    /// Whether the student has completed the question with this id.
    fn question_completed(&self, question_id: &str) -> bool;
}

/// Oracle for stages that never ask questions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoQuestions;

impl QuestionOracle for NoQuestions {
    fn question_completed(&self, _question_id: &str) -> bool {
        false
    }
}

/// Precondition for entering a marker.
///
/// `C` is the state the predicate reads, normally a
/// [`ComponentState`](crate::engine::ComponentState).
///
/// # Example
///
/// ```rust
/// use hubbleds::core::{Gate, NoQuestions};
///
/// let clicked_once = Gate::new(|clicks: &u32| *clicks == 1);
///
/// assert!(clicked_once.check(&1, &NoQuestions));
/// assert!(!clicked_once.check(&2, &NoQuestions));
/// ```
pub enum Gate<C> {
    /// Pure function of the stage state.
    State(Box<dyn Fn(&C) -> bool + Send + Sync>),
    /// Delegates to the question oracle.
    Question(String),
}

impl<C> Gate<C> {
    /// Gate from a pure predicate over the stage state.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Gate::State(Box::new(predicate))
    }

    /// Gate that opens once the given question is completed.
    pub fn question(question_id: impl Into<String>) -> Self {
        Gate::Question(question_id.into())
    }

    pub fn check(&self, state: &C, oracle: &dyn QuestionOracle) -> bool {
        match self {
            Gate::State(predicate) => predicate(state),
            Gate::Question(id) => oracle.question_completed(id),
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self, Gate::Question(_))
    }
}

impl<C> fmt::Debug for Gate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::State(_) => f.write_str("Gate::State(..)"),
            Gate::Question(id) => f.debug_tuple("Gate::Question").field(id).finish(),
        }
    }
}

/// Gates of one stage, indexed by marker ordinal.
pub struct GateTable<M: Marker, C> {
    gates: Vec<Option<Gate<C>>>,
    _marker: std::marker::PhantomData<M>,
}

impl<M: Marker, C> GateTable<M, C> {
    pub fn new() -> Self {
        Self {
            gates: M::SEQUENCE.iter().map(|_| None).collect(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Register a gate, returning the one it replaced.
    pub fn insert(&mut self, marker: M, gate: Gate<C>) -> Option<Gate<C>> {
        self.gates[marker.ordinal()].replace(gate)
    }

    pub fn get(&self, marker: M) -> Option<&Gate<C>> {
        self.gates[marker.ordinal()].as_ref()
    }

    /// Whether entering `marker` is allowed. Ungated markers always are.
    pub fn allows(&self, marker: M, state: &C, oracle: &dyn QuestionOracle) -> bool {
        self.get(marker).is_none_or(|gate| gate.check(state, oracle))
    }

    /// Markers guarded by a question gate.
    pub fn question_markers(&self) -> impl Iterator<Item = M> + '_ {
        M::SEQUENCE
            .iter()
            .copied()
            .filter(|m| self.get(*m).is_some_and(Gate::is_question))
    }

    pub fn len(&self) -> usize {
        self.gates.iter().filter(|g| g.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: Marker, C> Default for GateTable<M, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    crate::marker_enum! {
        enum TestMarker {
            LeaUnc1 => "lea_unc1",
            MosLik1 => "mos_lik1",
            AgeDis1 => "age_dis1",
        }
    }

    struct Answered(HashSet<&'static str>);

    impl QuestionOracle for Answered {
        fn question_completed(&self, question_id: &str) -> bool {
            self.0.contains(question_id)
        }
    }

    #[test]
    fn state_gate_checks_predicate() {
        let gate = Gate::new(|flag: &bool| *flag);

        assert!(gate.check(&true, &NoQuestions));
        assert!(!gate.check(&false, &NoQuestions));
    }

    #[test]
    fn question_gate_delegates_to_oracle() {
        let gate: Gate<()> = Gate::question("uncertainty-slideshow");

        assert!(!gate.check(&(), &Answered(HashSet::new())));
        assert!(gate.check(&(), &Answered(HashSet::from(["uncertainty-slideshow"]))));
    }

    #[test]
    fn gate_is_deterministic() {
        let gate = Gate::new(|n: &u32| *n > 2);

        assert_eq!(gate.check(&3, &NoQuestions), gate.check(&3, &NoQuestions));
    }

    #[test]
    fn missing_gate_is_passable() {
        let table: GateTable<TestMarker, ()> = GateTable::new();

        assert!(table.is_empty());
        assert!(table.allows(TestMarker::MosLik1, &(), &NoQuestions));
    }

    #[test]
    fn table_consults_registered_gate() {
        let mut table: GateTable<TestMarker, ()> = GateTable::new();
        table.insert(TestMarker::MosLik1, Gate::question("uncertainty-slideshow"));

        assert_eq!(table.len(), 1);
        assert!(!table.allows(TestMarker::MosLik1, &(), &NoQuestions));
        assert!(table.allows(TestMarker::AgeDis1, &(), &NoQuestions));
    }

    #[test]
    fn insert_returns_replaced_gate() {
        let mut table: GateTable<TestMarker, ()> = GateTable::new();

        assert!(table.insert(TestMarker::AgeDis1, Gate::new(|_| true)).is_none());
        assert!(table.insert(TestMarker::AgeDis1, Gate::new(|_| false)).is_some());
    }

    #[test]
    fn question_markers_lists_oracle_gates_only() {
        let mut table: GateTable<TestMarker, ()> = GateTable::new();
        table.insert(TestMarker::MosLik1, Gate::question("q"));
        table.insert(TestMarker::AgeDis1, Gate::new(|_| true));

        let markers: Vec<_> = table.question_markers().collect();
        assert_eq!(markers, vec![TestMarker::MosLik1]);
    }
}
