//! Per-stage component state.

use crate::core::{Dataset, Marker, MeasurementSet};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Stage-specific data carried next to the current marker.
///
/// Implementors are plain serializable structs; every field must survive a
/// save/load cycle unchanged.
pub trait StageData:
    Clone + Debug + PartialEq + Default + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Measurement collections owned by the stage, if any.
    fn measurement_sets(&self) -> Vec<&MeasurementSet> {
        Vec::new()
    }

    /// Currently selected galaxy per dataset.
    fn selected_galaxies(&self) -> Vec<(Dataset, &str)> {
        Vec::new()
    }
}

/// Current marker plus stage data for one student session.
///
/// Only the [`StageMachine`](super::StageMachine) moves `current_step`; data
/// changes go through [`StageMachine::modify`](super::StageMachine::modify).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ComponentState<M: Marker, D: StageData> {
    current_step: M,
    data: D,
}

impl<M: Marker, D: StageData> ComponentState<M, D> {
    pub fn new(current_step: M, data: D) -> Self {
        Self { current_step, data }
    }

    pub fn current_step(&self) -> M {
        self.current_step
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn is_current_step(&self, marker: M) -> bool {
        self.current_step == marker
    }

    pub fn current_step_between(&self, low: M, high: M) -> bool {
        self.current_step.is_between(low, high)
    }

    pub(crate) fn set_step(&mut self, marker: M) {
        self.current_step = marker;
    }

    pub(crate) fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }
}

impl<M: Marker, D: StageData> Default for ComponentState<M, D> {
    fn default() -> Self {
        Self::new(M::first(), D::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::marker_enum! {
        enum TestMarker {
            Start => "start",
            Middle => "middle",
            End => "end",
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Notes {
        seen: Option<u32>,
    }

    impl StageData for Notes {}

    #[test]
    fn default_starts_at_first_marker() {
        let state: ComponentState<TestMarker, Notes> = ComponentState::default();
        assert_eq!(state.current_step(), TestMarker::Start);
        assert_eq!(state.data(), &Notes::default());
    }

    #[test]
    fn step_queries_use_marker_order() {
        let state = ComponentState::new(TestMarker::Middle, Notes::default());
        assert!(state.is_current_step(TestMarker::Middle));
        assert!(state.current_step_between(TestMarker::End, TestMarker::Start));
        assert!(!state.current_step_between(TestMarker::End, TestMarker::End));
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = ComponentState::new(TestMarker::End, Notes { seen: None });
        let json = serde_json::to_string(&state).unwrap();
        let back: ComponentState<TestMarker, Notes> = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
        assert!(json.contains("\"current_step\":\"end\""));
        assert!(json.contains("\"seen\":null"));
    }
}
