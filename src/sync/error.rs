//! Sync error types.

use crate::validation::Violation;
use thiserror::Error;

/// Failures reported by a [`StateStore`](super::StateStore) backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("State store unavailable: {0}")]
    Unavailable(String),

    #[error("State store rejected write for {key}: {reason}")]
    Rejected { key: String, reason: String },
}

/// Errors that can occur during snapshot operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SnapshotError {
    /// Serialization to JSON failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot belongs to a different stage
    #[error("Snapshot is for stage '{found}', expected '{expected}'")]
    StageMismatch { expected: String, found: String },
}

/// Errors surfaced by load and save effects.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Stored state for stage '{stage}' is inconsistent ({} violations)", violations.len())]
    InvalidState {
        stage: String,
        violations: Vec<Violation>,
    },
}
