//! Consistency rules for stage data, using Validation.

use crate::core::{MeasurementKind, MeasurementSet};
use crate::engine::StageData;
use crate::validation::violations::{Violation, ViolationStrategy};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of checking stage data.
pub type CheckResult = Validation<(), NonEmptyVec<Violation>>;

/// Type alias for validation check functions
pub type ValidationCheck<D> = Box<dyn Fn(&D) -> CheckResult + Send + Sync>;

/// Rules a stage's data must satisfy before it is accepted from storage.
/// Uses Validation to accumulate ALL violations.
pub struct DataRules<D: StageData> {
    pub(crate) measurement_checks: bool,
    pub(crate) required_checks: Vec<ValidationCheck<D>>,
    pub(crate) on_violation: ViolationStrategy,
}

impl<D: StageData> DataRules<D> {
    /// Check `data` against every rule.
    /// Returns Validation::Failure with ALL violations if any fail.
    pub fn enforce(&self, data: &D) -> CheckResult {
        let mut checks: Vec<CheckResult> = Vec::new();

        if self.measurement_checks {
            for set in data.measurement_sets() {
                checks.push(unique_galaxy_ids(set));
                for kind in MeasurementKind::ALL {
                    checks.push(counter_covers_records(set, kind));
                }
            }

            for (dataset, galaxy_id) in data.selected_galaxies() {
                let has_record = data
                    .measurement_sets()
                    .iter()
                    .any(|set| set.dataset() == dataset && set.contains(galaxy_id));
                checks.push(if has_record {
                    Validation::success(())
                } else {
                    Validation::fail(Violation::SelectionWithoutRecord {
                        dataset,
                        galaxy_id: galaxy_id.to_string(),
                    })
                });
            }
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(data));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    pub fn violation_strategy(&self) -> ViolationStrategy {
        self.on_violation
    }
}

impl<D: StageData> Default for DataRules<D> {
    fn default() -> Self {
        Self {
            measurement_checks: true,
            required_checks: Vec::new(),
            on_violation: ViolationStrategy::default(),
        }
    }
}

fn unique_galaxy_ids(set: &MeasurementSet) -> CheckResult {
    let mut seen = HashSet::new();
    let checks: Vec<CheckResult> = set
        .iter()
        .filter(|m| !seen.insert(m.galaxy_id.as_str()))
        .map(|m| {
            Validation::fail(Violation::DuplicateMeasurement {
                dataset: set.dataset(),
                galaxy_id: m.galaxy_id.clone(),
            })
        })
        .collect();
    Validation::all_vec(checks).map(|_| ())
}

// Counters grow on every update call, so they may exceed the scan but never
// fall below it.
fn counter_covers_records(set: &MeasurementSet, kind: MeasurementKind) -> CheckResult {
    let counter = set.counters().get(kind);
    let scanned = set.scanned_count(kind);
    if (counter as usize) < scanned {
        Validation::fail(Violation::CounterBelowScanned {
            dataset: set.dataset(),
            kind,
            counter,
            scanned,
        })
    } else {
        Validation::success(())
    }
}
