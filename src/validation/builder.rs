//! Builder API for creating data rules.

use crate::engine::StageData;
use crate::validation::rules::{CheckResult, DataRules, ValidationCheck};
use crate::validation::violations::{Violation, ViolationStrategy};
use stillwater::validation::Validation;

/// Builder for creating data rules
pub struct RulesBuilder<D: StageData> {
    measurement_checks: bool,
    required_checks: Vec<ValidationCheck<D>>,
    on_violation: ViolationStrategy,
}

impl<D: StageData> RulesBuilder<D> {
    pub fn new() -> Self {
        Self {
            measurement_checks: true,
            required_checks: Vec::new(),
            on_violation: ViolationStrategy::default(),
        }
    }

    /// Do not run the built-in measurement consistency checks.
    pub fn skip_measurement_checks(mut self) -> Self {
        self.measurement_checks = false;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&D) -> CheckResult + Send + Sync + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&D) -> bool + Send + Sync + 'static,
    {
        let check = move |data: &D| {
            if predicate(data) {
                Validation::success(())
            } else {
                Validation::fail(Violation::CheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    pub fn on_violation(mut self, strategy: ViolationStrategy) -> Self {
        self.on_violation = strategy;
        self
    }

    pub fn build(self) -> DataRules<D> {
        DataRules {
            measurement_checks: self.measurement_checks,
            required_checks: self.required_checks,
            on_violation: self.on_violation,
        }
    }
}

impl<D: StageData> Default for RulesBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::ProfessionalData;

    #[test]
    fn builder_defaults_reject_with_measurement_checks() {
        let rules: DataRules<ProfessionalData> = RulesBuilder::new().build();

        assert_eq!(rules.violation_strategy(), ViolationStrategy::Reject);
        assert!(rules.measurement_checks);
    }

    #[test]
    fn violation_strategy_is_stored() {
        let rules: DataRules<ProfessionalData> = RulesBuilder::new()
            .on_violation(ViolationStrategy::IgnoreAndLog)
            .build();

        assert_eq!(rules.violation_strategy(), ViolationStrategy::IgnoreAndLog);
    }

    #[test]
    fn custom_check_sees_stage_data() {
        let rules = RulesBuilder::new()
            .require(|data: &ProfessionalData| {
                if data.ages_within > 0.0 {
                    Validation::success(())
                } else {
                    Validation::fail(Violation::CheckFailed {
                        message: "tolerance must be positive".to_string(),
                    })
                }
            })
            .build();

        let mut data = ProfessionalData::default();
        assert!(rules.enforce(&data).is_success());

        data.ages_within = 0.0;
        assert!(rules.enforce(&data).is_failure());
    }
}
