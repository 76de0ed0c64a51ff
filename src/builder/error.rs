//! Build errors for stage machines.

use thiserror::Error;

/// Errors that can occur when building a stage machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Stage '{stage}': gate on first marker '{marker}' can never be consulted")]
    GateOnFirstMarker { stage: String, marker: String },

    #[error("Stage '{stage}': more than one gate registered for '{marker}'")]
    DuplicateGate { stage: String, marker: String },

    #[error("Stage '{stage}': question gate on '{marker}' needs an oracle. Call .oracle(..)")]
    MissingOracle { stage: String, marker: String },

    #[error("Stage '{stage}': back jump from '{from}' must target an earlier marker, got '{to}'")]
    InvalidBackJump {
        stage: String,
        from: String,
        to: String,
    },
}
