//! Class results and uncertainty stage.

use crate::builder::{Stage, StageMachineBuilder};
use crate::engine::{StageData, StageMachine};
use crate::marker_enum;
use crate::quiz::QuizLog;
use serde::{Deserialize, Serialize};

marker_enum! {
    pub enum ClassResultsMarker {
        RanVar1 => "ran_var1",
        FinCla1 => "fin_cla1",
        ClaRes1 => "cla_res1",
        RelAge1 => "rel_age1",
        ClaAge1 => "cla_age1",
        ClaAge2 => "cla_age2",
        ClaAge3 => "cla_age3",
        ClaAge4 => "cla_age4",
        LeaUnc1 => "lea_unc1",
        MosLik1 => "mos_lik1",
        AgeDis1 => "age_dis1",
        MosLik2 => "mos_lik2",
        MosLik3 => "mos_lik3",
        MosLik4 => "mos_lik4",
        ConInt1 => "con_int1",
        ConInt2 => "con_int2",
        ConInt3 => "con_int3",
        ClaDat1 => "cla_dat1",
        TreLin2c => "tre_lin2c",
        BesFit1c => "bes_fit1c",
        YouAge1c => "you_age1c",
        ClaRes1c => "cla_res1c",
        ClaAge1c => "cla_age1c",
        AgeDis1c => "age_dis1c",
        ConInt2c => "con_int2c",
        TwoHis1 => "two_his1",
        TwoHis2 => "two_his2",
        TwoHis3 => "two_his3",
        TwoHis4 => "two_his4",
        TwoHis5 => "two_his5",
        MorDat1 => "mor_dat1",
    }
}

/// Question completed by finishing the uncertainty slideshow.
pub const UNCERTAINTY_SLIDESHOW: &str = "uncertainty-slideshow";

/// Whose age estimates a range or selection refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeScope {
    Student,
    Class,
}

/// Position in a multi-page slideshow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideshowState {
    pub step: u32,
    pub length: u32,
}

impl SlideshowState {
    pub fn new(length: u32) -> Self {
        Self { step: 0, length }
    }

    /// Move to `step`, clamped to the last page.
    pub fn go_to(&mut self, step: u32) {
        self.step = step.min(self.length.saturating_sub(1));
    }

    pub fn on_last_page(&self) -> bool {
        self.step + 1 >= self.length
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeCalcHints {
    pub hint1_dialog: bool,
    pub hint2_dialog: bool,
    pub hint3_dialog: bool,
}

/// Stage data for the class results stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassResultsData {
    pub student_low_age: u32,
    pub student_high_age: u32,
    pub class_low_age: u32,
    pub class_high_age: u32,
    pub uncertainty_state: SlideshowState,
    pub uncertainty_slideshow_finished: bool,
    pub mmm_state: SlideshowState,
    pub age_calc_state: AgeCalcHints,
    pub percentage_selection: Option<String>,
    pub statistics_selection: Option<String>,
    pub percentage_selection_class: Option<String>,
    pub statistics_selection_class: Option<String>,
}

impl Default for ClassResultsData {
    fn default() -> Self {
        Self {
            student_low_age: 0,
            student_high_age: 0,
            class_low_age: 0,
            class_high_age: 0,
            uncertainty_state: SlideshowState::new(8),
            uncertainty_slideshow_finished: false,
            mmm_state: SlideshowState::new(3),
            age_calc_state: AgeCalcHints::default(),
            percentage_selection: None,
            statistics_selection: None,
            percentage_selection_class: None,
            statistics_selection_class: None,
        }
    }
}

impl ClassResultsData {
    /// Titles of the mean/median/mode slideshow pages.
    pub const MMM_TITLES: [&'static str; 3] = ["Mean", "Median", "Mode"];

    /// Store an age range, ordering the bounds.
    pub fn set_age_range(&mut self, scope: AgeScope, low: u32, high: u32) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        match scope {
            AgeScope::Student => {
                self.student_low_age = low;
                self.student_high_age = high;
            }
            AgeScope::Class => {
                self.class_low_age = low;
                self.class_high_age = high;
            }
        }
    }

    pub fn age_range(&self, scope: AgeScope) -> (u32, u32) {
        match scope {
            AgeScope::Student => (self.student_low_age, self.student_high_age),
            AgeScope::Class => (self.class_low_age, self.class_high_age),
        }
    }

    pub fn select_percentage(&mut self, scope: AgeScope, selection: Option<String>) {
        match scope {
            AgeScope::Student => self.percentage_selection = selection,
            AgeScope::Class => self.percentage_selection_class = selection,
        }
    }

    pub fn select_statistic(&mut self, scope: AgeScope, selection: Option<String>) {
        match scope {
            AgeScope::Student => self.statistics_selection = selection,
            AgeScope::Class => self.statistics_selection_class = selection,
        }
    }

    pub fn finish_uncertainty_slideshow(&mut self) {
        self.uncertainty_slideshow_finished = true;
    }
}

impl StageData for ClassResultsData {}

/// The class results and uncertainty stage.
pub struct ClassResultsStage;

impl Stage for ClassResultsStage {
    type Marker = ClassResultsMarker;
    type Data = ClassResultsData;

    const ID: &'static str = "class_results";

    fn configure(
        builder: StageMachineBuilder<ClassResultsMarker, ClassResultsData>,
    ) -> StageMachineBuilder<ClassResultsMarker, ClassResultsData> {
        use ClassResultsMarker::*;

        builder
            .question(MosLik1, UNCERTAINTY_SLIDESHOW)
            .question(ClaAge1, "age-slope-trend")
            .question(TwoHis3, "histogram-range")
            .question(TwoHis4, "histogram-percent-range")
            .question(TwoHis5, "histogram-distribution")
    }
}

impl StageMachine<ClassResultsMarker, ClassResultsData> {
    /// Record that the uncertainty slideshow was read to the end and
    /// complete [`UNCERTAINTY_SLIDESHOW`] in `quiz`, which opens `mos_lik1`.
    pub fn finish_uncertainty_slideshow(&mut self, quiz: &QuizLog) {
        self.modify(ClassResultsData::finish_uncertainty_slideshow);
        quiz.mark_completed(UNCERTAINTY_SLIDESHOW);
        tracing::debug!(stage = self.stage_id(), "uncertainty slideshow finished");
    }
}
