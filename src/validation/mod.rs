//! Validation of stage data loaded from storage.
//!
//! Rules use Stillwater's `Validation` type, so a corrupt payload is reported
//! with every violation it contains instead of only the first.
//!
//! # Example
//!
//! ```rust
//! use hubbleds::stages::DistanceData;
//! use hubbleds::validation::{DataRules, RulesBuilder, ViolationStrategy};
//!
//! let rules: DataRules<DistanceData> = RulesBuilder::new()
//!     .require_pred(
//!         |d: &DistanceData| d.distance_constant() > 0.0,
//!         "distance constant must be positive".to_string(),
//!     )
//!     .on_violation(ViolationStrategy::Reject)
//!     .build();
//!
//! assert!(rules.enforce(&DistanceData::default()).is_success());
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::RulesBuilder;
pub use rules::{CheckResult, DataRules, ValidationCheck};
pub use violations::{Violation, ViolationStrategy};
