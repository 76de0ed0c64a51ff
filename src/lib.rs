//! hubbleds: stage progression and measurement bookkeeping for the Hubble's
//! Law Data Story.
//!
//! The crate follows a "pure core, imperative shell" layout. Marker
//! sequences, gates, measurement records and the transition engine are plain
//! functions over owned state; loading and saving are isolated in Stillwater
//! effects run against a [`sync::SyncEnv`].
//!
//! # Core Concepts
//!
//! - **Marker**: one step of a stage, declared with [`marker_enum!`]
//! - **Gate**: predicate guarding entry into a marker, either over the
//!   component state or over the quiz log
//! - **StageMachine**: moves the current step and notifies observers
//! - **MeasurementSet**: per-dataset galaxy records with reading counters
//! - **SyncAdapter**: load-on-mount and save-on-change with ordered revisions
//!
//! # Example
//!
//! ```rust
//! use hubbleds::builder::Stage;
//! use hubbleds::core::{Dataset, GalaxyData, QuestionOracle};
//! use hubbleds::quiz::QuizLog;
//! use hubbleds::stages::{DistanceMarker, DistanceStage};
//! use std::sync::Arc;
//!
//! let quiz = Arc::new(QuizLog::new());
//! let mut machine = DistanceStage::machine(quiz.clone() as Arc<dyn QuestionOracle>).unwrap();
//!
//! machine.transition_next();
//! let galaxy = GalaxyData {
//!     id: "G123".to_string(),
//!     name: "NGC 3198".to_string(),
//!     ra: 154.98,
//!     decl: 45.55,
//!     z: 0.0022,
//!     rest_wave: 6565.0,
//!     element: "H-α".to_string(),
//!     spectrum: Vec::new(),
//! };
//!
//! assert_eq!(machine.select_galaxy(Dataset::Example, galaxy), DistanceMarker::AngSiz2);
//! assert!(machine.data().measurements(Dataset::Example).contains("G123"));
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod engine;
pub mod quiz;
pub mod session;
pub mod stages;
pub mod sync;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, Stage, StageMachineBuilder};
pub use config::StoryConfig;
pub use core::{Dataset, Marker, Measurement, MeasurementError, MeasurementSet, QuestionOracle};
pub use engine::{ComponentState, Direction, StageData, StageMachine};
pub use quiz::QuizLog;
pub use session::StageSession;
