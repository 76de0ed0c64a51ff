//! Persistence and plotting-graph synchronization for stage state.
//!
//! - [`StateStore`] is the remote state API; [`MemoryStore`] implements it
//!   in-process.
//! - [`SyncAdapter`] builds load and save effects for one stage machine and
//!   keeps the loaded gate and save revisions.
//! - [`StageSnapshot`] is the stored, versioned form of a component state.
//! - [`DataCollection`] holds the linked datasets used for plotting.

pub mod adapter;
pub mod error;
pub mod graph;
pub mod snapshot;
pub mod store;

pub use adapter::{LoadOutcome, SaveReceipt, SyncAdapter, SyncEnv};
pub use error::{SnapshotError, StoreError, SyncError};
pub use graph::{
    DataCollection, FieldLink, GraphError, LinkedDataset, EXAMPLE_DATA_LABEL, STUDENT_DATA_LABEL,
};
pub use snapshot::{StageSnapshot, SNAPSHOT_VERSION};
pub use store::{MemoryStore, PutOutcome, StageKey, StateStore};
