//! Builder API for stage machine construction.
//!
//! This module provides the fluent [`StageMachineBuilder`], the
//! [`Stage`] configuration trait and the [`marker_enum!`](crate::marker_enum)
//! macro for declaring marker sequences.

pub mod error;
pub mod machine;
pub mod macros;
pub mod stage;

pub use error::BuildError;
pub use machine::StageMachineBuilder;
pub use stage::Stage;
