//! Versioned, serializable snapshots of a stage's component state.

use crate::core::Marker;
use crate::engine::{ComponentState, StageData};
use crate::sync::error::SnapshotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Stored form of one stage's component state.
///
/// The state itself is kept as a JSON value so a store can hold snapshots of
/// every stage without knowing their types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    pub stage_id: String,

    /// Save order within the session; higher wins.
    pub revision: u64,

    pub state: serde_json::Value,
}

impl StageSnapshot {
    pub fn capture<M: Marker, D: StageData>(
        stage_id: &str,
        revision: u64,
        state: &ComponentState<M, D>,
    ) -> Result<Self, SnapshotError> {
        let state = serde_json::to_value(state)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))?;

        Ok(Self {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            stage_id: stage_id.to_string(),
            revision,
            state,
        })
    }

    /// Decode the component state, checking format version and stage.
    pub fn restore<M: Marker, D: StageData>(
        &self,
        expected_stage: &str,
    ) -> Result<ComponentState<M, D>, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if self.stage_id != expected_stage {
            return Err(SnapshotError::StageMismatch {
                expected: expected_stage.to_string(),
                found: self.stage_id.clone(),
            });
        }

        serde_json::from_value(self.state.clone())
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{DistanceData, DistanceMarker};

    type DistanceState = ComponentState<DistanceMarker, DistanceData>;

    #[test]
    fn snapshot_restores_captured_state() {
        let state = DistanceState::new(DistanceMarker::EstDis2, DistanceData::default());
        let snapshot = StageSnapshot::capture("distance_measurements", 3, &state).unwrap();

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.revision, 3);
        let restored: DistanceState = snapshot.restore("distance_measurements").unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn snapshot_survives_json_text() {
        let mut data = DistanceData::default();
        data.ruler_clicked();
        let state = DistanceState::new(DistanceMarker::AngSiz4, data);
        let snapshot = StageSnapshot::capture("distance_measurements", 1, &state).unwrap();

        let json = snapshot.to_json().unwrap();
        let back = StageSnapshot::from_json(&json).unwrap();

        assert_eq!(back, snapshot);
        assert!(json.contains("\"current_step\":\"ang_siz4\""));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let state = DistanceState::default();
        let mut snapshot = StageSnapshot::capture("distance_measurements", 1, &state).unwrap();
        snapshot.version = 99;

        let err = snapshot
            .restore::<DistanceMarker, DistanceData>("distance_measurements")
            .unwrap_err();

        assert_eq!(
            err,
            SnapshotError::UnsupportedVersion {
                found: 99,
                supported: SNAPSHOT_VERSION
            }
        );
    }

    #[test]
    fn other_stage_is_rejected() {
        let state = DistanceState::default();
        let snapshot = StageSnapshot::capture("class_results", 1, &state).unwrap();

        let err = snapshot
            .restore::<DistanceMarker, DistanceData>("distance_measurements")
            .unwrap_err();

        assert!(matches!(err, SnapshotError::StageMismatch { .. }));
    }

    #[test]
    fn malformed_state_fails_to_decode() {
        let state = DistanceState::default();
        let mut snapshot = StageSnapshot::capture("distance_measurements", 1, &state).unwrap();
        snapshot.state["current_step"] = serde_json::json!("not_a_marker");

        let err = snapshot
            .restore::<DistanceMarker, DistanceData>("distance_measurements")
            .unwrap_err();

        assert!(matches!(err, SnapshotError::DeserializationFailed(_)));
    }
}
