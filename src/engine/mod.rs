//! Transition engine for stage progression.
//!
//! A [`StageMachine`] owns one [`ComponentState`] and is the only thing that
//! moves its current step. Single steps forward consult gates, single steps
//! back never do, and [`StageMachine::transition_to`] is the only
//! non-adjacent move.

mod machine;
mod state;

pub use machine::{Direction, Observer, StageGates, StageMachine, StepChange};
pub use state::{ComponentState, StageData};
