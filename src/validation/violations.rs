//! Consistency violations and how to handle them.

use crate::core::{Dataset, MeasurementKind};
use thiserror::Error;

/// Ways a loaded stage state can be inconsistent.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("Duplicate {dataset} measurement for galaxy '{galaxy_id}'")]
    DuplicateMeasurement { dataset: Dataset, galaxy_id: String },

    #[error("{dataset} {kind} counter is {counter} but {scanned} records carry a reading")]
    CounterBelowScanned {
        dataset: Dataset,
        kind: MeasurementKind,
        counter: u32,
        scanned: usize,
    },

    #[error("Selected {dataset} galaxy '{galaxy_id}' has no measurement")]
    SelectionWithoutRecord { dataset: Dataset, galaxy_id: String },

    #[error("Check failed: {message}")]
    CheckFailed { message: String },
}

/// What to do with a loaded state that has violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViolationStrategy {
    /// Keep the current state and report the violations.
    #[default]
    Reject,

    /// Apply the loaded state anyway, logging the violations.
    IgnoreAndLog,
}
