//! Stage configuration.

use crate::builder::error::BuildError;
use crate::builder::machine::StageMachineBuilder;
use crate::config::StoryConfig;
use crate::core::{Marker, QuestionOracle};
use crate::engine::{ComponentState, StageData, StageMachine};
use std::sync::Arc;

/// A top-level section of the data story: its marker sequence, its data and
/// its gate table.
///
/// The transition engine is shared by all stages; a stage only supplies
/// configuration.
pub trait Stage {
    type Marker: Marker;
    type Data: StageData;

    /// Key used for persistence and logging.
    const ID: &'static str;

    /// Register the stage's gates and back jumps.
    fn configure(
        builder: StageMachineBuilder<Self::Marker, Self::Data>,
    ) -> StageMachineBuilder<Self::Marker, Self::Data>;

    /// Data a new session starts with.
    fn initial_data(_config: &StoryConfig) -> Self::Data {
        Self::Data::default()
    }

    /// A machine for this stage, starting at its first marker.
    fn machine(
        oracle: Arc<dyn QuestionOracle>,
    ) -> Result<StageMachine<Self::Marker, Self::Data>, BuildError> {
        Self::configure(StageMachineBuilder::new(Self::ID).oracle(oracle)).build()
    }

    /// Like [`machine`](Self::machine), with initial data taken from `config`.
    fn machine_with_config(
        config: &StoryConfig,
        oracle: Arc<dyn QuestionOracle>,
    ) -> Result<StageMachine<Self::Marker, Self::Data>, BuildError> {
        let initial = ComponentState::new(Self::Marker::first(), Self::initial_data(config));
        Self::configure(
            StageMachineBuilder::new(Self::ID)
                .initial(initial)
                .oracle(oracle),
        )
        .build()
    }
}
