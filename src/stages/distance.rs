//! Distance measurements stage.
//!
//! Students measure the angular size of an example galaxy with the ruler,
//! turn it into a distance, compare with the class on dotplots and then
//! repeat the measurement for their own galaxies.

use crate::builder::{Stage, StageMachineBuilder};
use crate::config::StoryConfig;
use crate::core::{
    distance_with_constant, Dataset, GalaxyData, Marker, MeasurementError, MeasurementKind,
    MeasurementSet, DISTANCE_CONSTANT,
};
use crate::engine::{ComponentState, StageData, StageMachine};
use crate::marker_enum;
use serde::{Deserialize, Serialize};

marker_enum! {
    pub enum DistanceMarker {
        AngSiz1 => "ang_siz1",
        ChoRow1 => "cho_row1",
        AngSiz2 => "ang_siz2",
        AngSiz2b => "ang_siz2b",
        AngSiz3 => "ang_siz3",
        AngSiz4 => "ang_siz4",
        AngSiz5 => "ang_siz5",
        AngSiz5a => "ang_siz5a",
        AngSiz6 => "ang_siz6",
        DotSeq1 => "dot_seq1",
        DotSeq2 => "dot_seq2",
        DotSeq3 => "dot_seq3",
        DotSeq4 => "dot_seq4",
        DotSeq4a => "dot_seq4a",
        AngSiz7 => "ang_siz7",
        EstDis1 => "est_dis1",
        EstDis2 => "est_dis2",
        ChoRow2 => "cho_row2",
        EstDis3 => "est_dis3",
        EstDis4 => "est_dis4",
        DotSeq5 => "dot_seq5",
        DotSeq5a => "dot_seq5a",
        DotSeq5b => "dot_seq5b",
        DotSeq5c => "dot_seq5c",
        DotSeq6 => "dot_seq6",
        DotSeq7 => "dot_seq7",
        RepRem1 => "rep_rem1",
        FilRem1 => "fil_rem1",
    }
}

/// Marker ranges (inclusive) during which the distance ruler is shown.
pub const RULER_RANGES: [(DistanceMarker, DistanceMarker); 2] = [
    (DistanceMarker::AngSiz3, DistanceMarker::DotSeq4a),
    (DistanceMarker::DotSeq5, DistanceMarker::FilRem1),
];

/// Stage data for the distance measurements stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceData {
    student: MeasurementSet,
    example: MeasurementSet,
    selected_galaxy: Option<GalaxyData>,
    selected_example_galaxy: Option<GalaxyData>,
    lambda_rest: Option<f64>,
    lambda_obs: Option<f64>,
    ruler_click_count: u32,
    dosdonts_tutorial_opened: bool,
    distance_constant: f64,
}

impl Default for DistanceData {
    fn default() -> Self {
        Self {
            student: MeasurementSet::new(Dataset::Student),
            example: MeasurementSet::new(Dataset::Example),
            selected_galaxy: None,
            selected_example_galaxy: None,
            lambda_rest: None,
            lambda_obs: None,
            ruler_click_count: 0,
            dosdonts_tutorial_opened: false,
            distance_constant: DISTANCE_CONSTANT,
        }
    }
}

impl DistanceData {
    pub fn with_distance_constant(distance_constant: f64) -> Self {
        Self {
            distance_constant,
            ..Self::default()
        }
    }

    /// Start the example table from `catalog`, one numbered record per galaxy.
    pub fn with_example_catalog(self, catalog: &[GalaxyData]) -> Self {
        Self {
            example: MeasurementSet::seed_from_catalog(Dataset::Example, catalog),
            ..self
        }
    }

    pub fn measurements(&self, dataset: Dataset) -> &MeasurementSet {
        match dataset {
            Dataset::Student => &self.student,
            Dataset::Example => &self.example,
        }
    }

    fn measurements_mut(&mut self, dataset: Dataset) -> &mut MeasurementSet {
        match dataset {
            Dataset::Student => &mut self.student,
            Dataset::Example => &mut self.example,
        }
    }

    pub fn selected_galaxy(&self, dataset: Dataset) -> Option<&GalaxyData> {
        match dataset {
            Dataset::Student => self.selected_galaxy.as_ref(),
            Dataset::Example => self.selected_example_galaxy.as_ref(),
        }
    }

    pub fn lambda_rest(&self) -> Option<f64> {
        self.lambda_rest
    }

    pub fn lambda_obs(&self) -> Option<f64> {
        self.lambda_obs
    }

    pub fn ruler_click_count(&self) -> u32 {
        self.ruler_click_count
    }

    pub fn dosdonts_tutorial_opened(&self) -> bool {
        self.dosdonts_tutorial_opened
    }

    pub fn distance_constant(&self) -> f64 {
        self.distance_constant
    }

    /// Make `galaxy` the selection for `dataset`, creating an empty
    /// measurement on first selection. Returns whether one was created.
    pub fn select_galaxy(&mut self, dataset: Dataset, galaxy: GalaxyData) -> bool {
        let created = self.measurements_mut(dataset).ensure(&galaxy.id);
        self.lambda_rest = Some(galaxy.rest_wave);
        self.lambda_obs = None;
        match dataset {
            Dataset::Student => self.selected_galaxy = Some(galaxy),
            Dataset::Example => self.selected_example_galaxy = Some(galaxy),
        }
        created
    }

    pub fn update_observed_wavelength(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        wavelength: f64,
    ) -> Result<(), MeasurementError> {
        self.measurements_mut(dataset)
            .update_observed_wavelength(galaxy_id, wavelength)?;
        self.lambda_obs = Some(wavelength);
        Ok(())
    }

    pub fn update_angular_size(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        angle: f64,
    ) -> Result<(), MeasurementError> {
        self.measurements_mut(dataset)
            .update_angular_size(galaxy_id, angle)?;
        Ok(())
    }

    /// Store the distance implied by angular size `theta`. Returns it.
    pub fn update_distance(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        theta: f64,
    ) -> Result<f64, MeasurementError> {
        if !self.measurements(dataset).contains(galaxy_id) {
            return Err(MeasurementError::NotFound {
                dataset,
                galaxy_id: galaxy_id.to_string(),
            });
        }
        let distance = distance_with_constant(self.distance_constant, theta)?;
        self.measurements_mut(dataset)
            .update_distance(galaxy_id, distance)?;
        Ok(distance)
    }

    pub fn update_velocity(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        velocity: f64,
    ) -> Result<(), MeasurementError> {
        self.measurements_mut(dataset)
            .update_velocity(galaxy_id, velocity)?;
        Ok(())
    }

    /// Count a click on the ruler tool. Returns the new count.
    pub fn ruler_clicked(&mut self) -> u32 {
        self.ruler_click_count += 1;
        self.ruler_click_count
    }

    pub fn open_dosdonts_tutorial(&mut self) {
        self.dosdonts_tutorial_opened = true;
    }
}

impl StageData for DistanceData {
    fn measurement_sets(&self) -> Vec<&MeasurementSet> {
        vec![&self.student, &self.example]
    }

    fn selected_galaxies(&self) -> Vec<(Dataset, &str)> {
        [Dataset::Student, Dataset::Example]
            .into_iter()
            .filter_map(|d| self.selected_galaxy(d).map(|g| (d, g.id.as_str())))
            .collect()
    }
}

impl ComponentState<DistanceMarker, DistanceData> {
    /// The ruler is visible while the current step lies in a ruler range.
    pub fn show_ruler(&self) -> bool {
        RULER_RANGES
            .iter()
            .any(|(low, high)| self.current_step_between(*low, *high))
    }

    /// The angular size do's and don'ts slideshow is offered from `ang_siz5a` on.
    pub fn dosdonts_available(&self) -> bool {
        self.current_step() >= DistanceMarker::AngSiz5a
    }
}

/// The distance measurements stage.
pub struct DistanceStage;

impl Stage for DistanceStage {
    type Marker = DistanceMarker;
    type Data = DistanceData;

    const ID: &'static str = "distance_measurements";

    fn initial_data(config: &StoryConfig) -> DistanceData {
        DistanceData::with_distance_constant(config.distance_constant)
            .with_example_catalog(&config.example_galaxies)
    }

    fn configure(
        builder: StageMachineBuilder<DistanceMarker, DistanceData>,
    ) -> StageMachineBuilder<DistanceMarker, DistanceData> {
        use DistanceMarker::*;

        builder
            .when(AngSiz2, |s| {
                s.data().selected_galaxy(Dataset::Example).is_some()
            })
            .when(AngSiz4, |s| s.data().ruler_click_count() == 1)
            .when(AngSiz5, |s| {
                s.data()
                    .measurements(Dataset::Example)
                    .counters()
                    .angular_sizes
                    > 0
            })
            .when(AngSiz6, |s| s.data().dosdonts_tutorial_opened())
            .question(DotSeq3, "ang_meas_consensus")
            .question(AngSiz7, "ang_meas_dist_relation")
            .when(EstDis4, |s| {
                s.data().measurements(Dataset::Example).counters().distances > 0
            })
            .question(DotSeq7, "ang_meas_consensus_2")
            .when(FilRem1, |s| {
                s.data()
                    .measurements(Dataset::Student)
                    .all_have(MeasurementKind::AngularSize)
            })
            .back_jump(RepRem1, DotSeq5)
    }
}

impl StageMachine<DistanceMarker, DistanceData> {
    /// Select a galaxy in one of the tables.
    ///
    /// Choosing the example galaxy on a "choose a row" step moves on to the
    /// measurement that row was chosen for.
    pub fn select_galaxy(&mut self, dataset: Dataset, galaxy: GalaxyData) -> DistanceMarker {
        let galaxy_id = galaxy.id.clone();
        let created = self.modify(|data| data.select_galaxy(dataset, galaxy));
        tracing::debug!(
            stage = self.stage_id(),
            %dataset,
            galaxy_id = %galaxy_id,
            created,
            "galaxy selected"
        );

        match (dataset, self.current_step()) {
            (Dataset::Example, DistanceMarker::ChoRow1) => {
                self.transition_to(DistanceMarker::AngSiz2, false)
            }
            (Dataset::Example, DistanceMarker::ChoRow2) => {
                self.transition_to(DistanceMarker::EstDis3, false)
            }
            (_, current) => current,
        }
    }

    pub fn update_observed_wavelength(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        wavelength: f64,
    ) -> Result<(), MeasurementError> {
        let result = self.try_modify(|data| {
            data.update_observed_wavelength(dataset, galaxy_id, wavelength)
        });
        self.log_update_failure(&result);
        result
    }

    pub fn update_angular_size(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        angle: f64,
    ) -> Result<(), MeasurementError> {
        let result = self.try_modify(|data| data.update_angular_size(dataset, galaxy_id, angle));
        self.log_update_failure(&result);
        result
    }

    pub fn update_distance(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        theta: f64,
    ) -> Result<f64, MeasurementError> {
        let result = self.try_modify(|data| data.update_distance(dataset, galaxy_id, theta));
        self.log_update_failure(&result);
        result
    }

    pub fn update_velocity(
        &mut self,
        dataset: Dataset,
        galaxy_id: &str,
        velocity: f64,
    ) -> Result<(), MeasurementError> {
        let result = self.try_modify(|data| data.update_velocity(dataset, galaxy_id, velocity));
        self.log_update_failure(&result);
        result
    }

    pub fn ruler_clicked(&mut self) -> u32 {
        self.modify(DistanceData::ruler_clicked)
    }

    pub fn open_dosdonts_tutorial(&mut self) {
        self.modify(DistanceData::open_dosdonts_tutorial)
    }

    fn log_update_failure<T>(&self, result: &Result<T, MeasurementError>) {
        if let Err(error) = result {
            tracing::warn!(
                stage = self.stage_id(),
                step = self.current_step().name(),
                %error,
                "measurement update rejected"
            );
        }
    }
}
