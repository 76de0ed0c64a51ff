//! The data story's stages.
//!
//! Each stage declares its marker sequence, its data and its gates; the
//! transition engine itself lives in [`crate::engine`].

mod class_results;
mod distance;
mod pro_data;

pub use class_results::{
    AgeCalcHints, AgeScope, ClassResultsData, ClassResultsMarker, ClassResultsStage,
    SlideshowState, UNCERTAINTY_SLIDESHOW,
};
pub use distance::{DistanceData, DistanceMarker, DistanceStage, RULER_RANGES};
pub use pro_data::{ProDataMarker, ProfessionalData, ProfessionalDataStage, HST_KEY_AGE};
