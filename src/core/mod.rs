//! Core stage types and logic.
//!
//! This module contains the pure part of the data story:
//! - Marker sequences via the `Marker` trait
//! - Gate predicates for forward progress
//! - Immutable step history
//! - Measurement records and the distance estimate
//!
//! Nothing here performs I/O; persistence lives in [`crate::sync`].

mod distance;
mod gate;
mod history;
mod marker;
mod measurement;

pub use distance::{distance_from_angular_size, distance_with_constant, DomainError, DISTANCE_CONSTANT};
pub use gate::{Gate, GateTable, NoQuestions, QuestionOracle};
pub use history::{StepHistory, StepKind, StepTransition};
pub use marker::Marker;
pub use measurement::{
    Dataset, GalaxyData, Measurement, MeasurementCounters, MeasurementError, MeasurementKind,
    MeasurementSet, SpectrumSample,
};
