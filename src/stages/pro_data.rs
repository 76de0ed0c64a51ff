//! Professional data stage.

use crate::builder::{Stage, StageMachineBuilder};
use crate::engine::{StageData, StageMachine};
use crate::marker_enum;
use serde::{Deserialize, Serialize};

marker_enum! {
    pub enum ProDataMarker {
        ProDat0 => "pro_dat0",
        ProDat1 => "pro_dat1",
        ProDat2 => "pro_dat2",
        ProDat3 => "pro_dat3",
        ProDat4 => "pro_dat4",
        ProDat5 => "pro_dat5",
        ProDat6 => "pro_dat6",
        ProDat7 => "pro_dat7",
        ProDat8 => "pro_dat8",
        ProDat9 => "pro_dat9",
        StoFin1 => "sto_fin1",
        StoFin2 => "sto_fin2",
        StoFin3 => "sto_fin3",
    }
}

/// Age of the universe in Gyr from the HST Key Project fit.
pub const HST_KEY_AGE: f64 = 12.79;

/// Stage data for the professional data stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalData {
    pub hst_age: f64,
    pub our_age: f64,
    pub class_age: f64,
    /// Relative difference from `hst_age` still counted as agreement.
    pub ages_within: f64,
    pub allow_too_close_correct: bool,
    pub fit_line_shown: bool,
}

impl Default for ProfessionalData {
    fn default() -> Self {
        Self {
            hst_age: HST_KEY_AGE,
            our_age: 0.0,
            class_age: 0.0,
            ages_within: 0.15,
            allow_too_close_correct: false,
            fit_line_shown: false,
        }
    }
}

impl ProfessionalData {
    /// Whether `age` agrees with the HST age to within `ages_within`.
    pub fn age_within_tolerance(&self, age: f64) -> bool {
        if !age.is_finite() || self.hst_age <= 0.0 {
            return false;
        }
        (age - self.hst_age).abs() / self.hst_age <= self.ages_within
    }
}

impl StageData for ProfessionalData {}

/// The professional data stage.
pub struct ProfessionalDataStage;

impl Stage for ProfessionalDataStage {
    type Marker = ProDataMarker;
    type Data = ProfessionalData;

    const ID: &'static str = "professional_data";

    fn configure(
        builder: StageMachineBuilder<ProDataMarker, ProfessionalData>,
    ) -> StageMachineBuilder<ProDataMarker, ProfessionalData> {
        use ProDataMarker::*;

        builder
            .question(ProDat2, "pro-dat1")
            .question(ProDat3, "pro-dat2")
            .question(ProDat4, "pro-dat3")
            .question(ProDat5, "pro-dat4")
            .question(ProDat7, "pro-dat6")
            .question(ProDat8, "pro-dat7")
            .question(StoFin1, "pro-dat9")
    }
}

impl StageMachine<ProDataMarker, ProfessionalData> {
    /// Record the class age and whether it counts as agreeing with HST.
    pub fn record_class_age(&mut self, age: f64) -> bool {
        self.modify(|data| {
            data.class_age = age;
            data.age_within_tolerance(age)
        })
    }

    pub fn show_fit_line(&mut self) {
        self.modify(|data| data.fit_line_shown = true);
    }
}
