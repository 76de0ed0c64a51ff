//! Galaxy measurement records and per-dataset collections.
//!
//! A [`Measurement`] is a value: updates produce a new record that replaces the
//! old one wholesale. A [`MeasurementSet`] owns the records of one dataset,
//! keyed by galaxy id, together with the counters that cache how many
//! readings of each kind have been taken.

use super::distance::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which of the two keyspaces a measurement lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// The student's own galaxies.
    Student,
    /// The shared, instructor-curated practice galaxies.
    Example,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => f.write_str("student"),
            Self::Example => f.write_str("example"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementError {
    #[error("No {dataset} measurement for galaxy '{galaxy_id}'")]
    NotFound { dataset: Dataset, galaxy_id: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One sample of a galaxy spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSample {
    pub wave: f64,
    pub flux: f64,
}

/// Read-only catalog entry for a galaxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalaxyData {
    pub id: String,
    pub name: String,
    pub ra: f64,
    pub decl: f64,
    pub z: f64,
    /// Rest wavelength of the spectral line, in Angstroms.
    pub rest_wave: f64,
    /// Spectral element, e.g. `"H-α"`.
    pub element: String,
    #[serde(default)]
    pub spectrum: Vec<SpectrumSample>,
}

/// Observation state of one galaxy in one dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub galaxy_id: String,
    pub galaxy: Option<GalaxyData>,
    pub obs_wave_value: Option<f64>,
    pub ang_size_value: Option<f64>,
    pub est_dist_value: Option<f64>,
    pub velocity_value: Option<f64>,
    pub measurement_number: Option<u32>,
}

impl Measurement {
    /// A record with only the galaxy id set.
    pub fn empty(galaxy_id: impl Into<String>) -> Self {
        Self {
            galaxy_id: galaxy_id.into(),
            galaxy: None,
            obs_wave_value: None,
            ang_size_value: None,
            est_dist_value: None,
            velocity_value: None,
            measurement_number: None,
        }
    }

    /// A record carrying catalog metadata and a sequence number.
    pub fn for_galaxy(galaxy: GalaxyData, number: u32) -> Self {
        Self {
            measurement_number: Some(number),
            ..Self::empty(galaxy.id.clone())
        }
        .with_galaxy(galaxy)
    }

    pub fn with_galaxy(self, galaxy: GalaxyData) -> Self {
        Self {
            galaxy: Some(galaxy),
            ..self
        }
    }

    pub fn with_observed_wavelength(self, wavelength: f64) -> Self {
        Self {
            obs_wave_value: Some(wavelength),
            ..self
        }
    }

    pub fn with_angular_size(self, angle: f64) -> Self {
        Self {
            ang_size_value: Some(angle),
            ..self
        }
    }

    pub fn with_distance(self, distance: f64) -> Self {
        Self {
            est_dist_value: Some(distance),
            ..self
        }
    }

    pub fn with_velocity(self, velocity: f64) -> Self {
        Self {
            velocity_value: Some(velocity),
            ..self
        }
    }

    /// Whether the reading of this kind has been taken.
    pub fn has(&self, kind: MeasurementKind) -> bool {
        match kind {
            MeasurementKind::Wavelength => self.obs_wave_value.is_some(),
            MeasurementKind::AngularSize => self.ang_size_value.is_some(),
            MeasurementKind::Distance => self.est_dist_value.is_some(),
            MeasurementKind::Velocity => self.velocity_value.is_some(),
        }
    }

    /// Every reading has been taken.
    pub fn is_complete(&self) -> bool {
        MeasurementKind::ALL.iter().all(|kind| self.has(*kind))
    }
}

/// The kinds of reading a measurement accumulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Wavelength,
    AngularSize,
    Distance,
    Velocity,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 4] = [
        Self::Wavelength,
        Self::AngularSize,
        Self::Distance,
        Self::Velocity,
    ];

    /// Check that `value` is a storable reading of this kind.
    ///
    /// Every reading must be finite. Wavelengths, angular sizes and distances
    /// must also be positive; velocities may be negative.
    pub fn check(self, value: f64) -> Result<f64, DomainError> {
        let valid = value.is_finite() && (self == Self::Velocity || value > 0.0);
        if valid {
            return Ok(value);
        }
        Err(match self {
            Self::Wavelength => DomainError::InvalidWavelength(value),
            Self::AngularSize => DomainError::InvalidAngularSize(value),
            Self::Distance => DomainError::InvalidDistance(value),
            Self::Velocity => DomainError::NonFiniteReading(value),
        })
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wavelength => f.write_str("wavelength"),
            Self::AngularSize => f.write_str("angular size"),
            Self::Distance => f.write_str("distance"),
            Self::Velocity => f.write_str("velocity"),
        }
    }
}

/// Number of readings of each kind taken so far.
///
/// Incremented once per update call, so repeated readings of the same galaxy
/// are all counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementCounters {
    pub wavelengths: u32,
    pub angular_sizes: u32,
    pub distances: u32,
    pub velocities: u32,
}

impl MeasurementCounters {
    pub fn get(&self, kind: MeasurementKind) -> u32 {
        match kind {
            MeasurementKind::Wavelength => self.wavelengths,
            MeasurementKind::AngularSize => self.angular_sizes,
            MeasurementKind::Distance => self.distances,
            MeasurementKind::Velocity => self.velocities,
        }
    }

    fn increment(&mut self, kind: MeasurementKind) {
        let counter = match kind {
            MeasurementKind::Wavelength => &mut self.wavelengths,
            MeasurementKind::AngularSize => &mut self.angular_sizes,
            MeasurementKind::Distance => &mut self.distances,
            MeasurementKind::Velocity => &mut self.velocities,
        };
        *counter += 1;
    }
}

/// Measurements of one dataset, in insertion order, keyed by galaxy id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    dataset: Dataset,
    measurements: Vec<Measurement>,
    counters: MeasurementCounters,
}

impl MeasurementSet {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            measurements: Vec::new(),
            counters: MeasurementCounters::default(),
        }
    }

    /// One numbered record per catalog galaxy, in catalog order.
    ///
    /// Galaxies repeating an earlier id are skipped.
    pub fn seed_from_catalog(dataset: Dataset, catalog: &[GalaxyData]) -> Self {
        let mut set = Self::new(dataset);
        for galaxy in catalog {
            if !set.contains(&galaxy.id) {
                let number = set.measurements.len() as u32 + 1;
                set.measurements
                    .push(Measurement::for_galaxy(galaxy.clone(), number));
            }
        }
        set
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn counters(&self) -> &MeasurementCounters {
        &self.counters
    }

    pub fn get(&self, galaxy_id: &str) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.galaxy_id == galaxy_id)
    }

    pub fn contains(&self, galaxy_id: &str) -> bool {
        self.get(galaxy_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Insert an empty record for `galaxy_id` unless one exists.
    ///
    /// Returns `true` when a record was created.
    pub fn ensure(&mut self, galaxy_id: &str) -> bool {
        if self.contains(galaxy_id) {
            return false;
        }
        self.measurements.push(Measurement::empty(galaxy_id));
        true
    }

    /// Number of records where the reading of `kind` is present.
    pub fn scanned_count(&self, kind: MeasurementKind) -> usize {
        self.measurements.iter().filter(|m| m.has(kind)).count()
    }

    /// Every record has a reading of `kind`. False for an empty set.
    pub fn all_have(&self, kind: MeasurementKind) -> bool {
        !self.is_empty() && self.measurements.iter().all(|m| m.has(kind))
    }

    pub fn update_observed_wavelength(
        &mut self,
        galaxy_id: &str,
        wavelength: f64,
    ) -> Result<&Measurement, MeasurementError> {
        self.replace(
            galaxy_id,
            MeasurementKind::Wavelength,
            wavelength,
            Measurement::with_observed_wavelength,
        )
    }

    pub fn update_angular_size(
        &mut self,
        galaxy_id: &str,
        angle: f64,
    ) -> Result<&Measurement, MeasurementError> {
        self.replace(
            galaxy_id,
            MeasurementKind::AngularSize,
            angle,
            Measurement::with_angular_size,
        )
    }

    pub fn update_distance(
        &mut self,
        galaxy_id: &str,
        distance: f64,
    ) -> Result<&Measurement, MeasurementError> {
        self.replace(
            galaxy_id,
            MeasurementKind::Distance,
            distance,
            Measurement::with_distance,
        )
    }

    pub fn update_velocity(
        &mut self,
        galaxy_id: &str,
        velocity: f64,
    ) -> Result<&Measurement, MeasurementError> {
        self.replace(
            galaxy_id,
            MeasurementKind::Velocity,
            velocity,
            Measurement::with_velocity,
        )
    }

    /// Replace the record for `galaxy_id` and bump the `kind` counter.
    ///
    /// A missing record or an invalid `value` leaves the set untouched.
    fn replace<F>(
        &mut self,
        galaxy_id: &str,
        kind: MeasurementKind,
        value: f64,
        update: F,
    ) -> Result<&Measurement, MeasurementError>
    where
        F: FnOnce(Measurement, f64) -> Measurement,
    {
        let dataset = self.dataset;
        let index = self
            .measurements
            .iter()
            .position(|m| m.galaxy_id == galaxy_id)
            .ok_or_else(|| MeasurementError::NotFound {
                dataset,
                galaxy_id: galaxy_id.to_string(),
            })?;

        let value = kind.check(value)?;
        let updated = update(self.measurements[index].clone(), value);
        self.measurements[index] = updated;
        self.counters.increment(kind);
        Ok(&self.measurements[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn galaxy(id: &str) -> GalaxyData {
        GalaxyData {
            id: id.to_string(),
            name: format!("SDSS {id}"),
            ra: 210.5,
            decl: 54.3,
            z: 0.023,
            rest_wave: 6565.0,
            element: "H-α".to_string(),
            spectrum: vec![SpectrumSample {
                wave: 6700.0,
                flux: 12.5,
            }],
        }
    }

    #[test]
    fn empty_measurement_has_only_id() {
        let m = Measurement::empty("G123");
        assert_eq!(m.galaxy_id, "G123");
        assert!(m.galaxy.is_none());
        assert!(MeasurementKind::ALL.iter().all(|k| !m.has(*k)));
        assert!(m.measurement_number.is_none());
    }

    #[test]
    fn with_methods_replace_single_field() {
        let m = Measurement::empty("G1").with_angular_size(42.0);
        assert_eq!(m.ang_size_value, Some(42.0));
        assert!(m.est_dist_value.is_none());
        assert!(!m.is_complete());

        let m = m
            .with_distance(3404.0)
            .with_observed_wavelength(6710.0)
            .with_velocity(6650.0);
        assert!(m.is_complete());
    }

    #[test]
    fn ensure_creates_once() {
        let mut set = MeasurementSet::new(Dataset::Student);
        assert!(set.ensure("G1"));
        assert!(!set.ensure("G1"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn update_missing_galaxy_is_not_found() {
        let mut set = MeasurementSet::new(Dataset::Example);
        let err = set.update_angular_size("G404", 10.0).unwrap_err();
        assert_eq!(
            err,
            MeasurementError::NotFound {
                dataset: Dataset::Example,
                galaxy_id: "G404".to_string(),
            }
        );
        assert_eq!(set.counters().angular_sizes, 0);
    }

    #[test]
    fn update_touches_only_target_record_and_counter() {
        let mut set = MeasurementSet::new(Dataset::Student);
        set.ensure("G1");
        set.ensure("G2");
        let before_other = set.get("G2").cloned();

        let updated = set.update_angular_size("G1", 35.0).unwrap();
        assert_eq!(updated.ang_size_value, Some(35.0));

        assert_eq!(set.get("G2").cloned(), before_other);
        assert_eq!(set.counters().angular_sizes, 1);
        assert_eq!(set.counters().distances, 0);
        assert_eq!(set.counters().wavelengths, 0);
    }

    #[test]
    fn non_finite_readings_are_rejected() {
        let mut set = MeasurementSet::new(Dataset::Student);
        set.ensure("G1");
        let before = set.clone();

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                set.update_observed_wavelength("G1", value),
                Err(MeasurementError::Domain(DomainError::InvalidWavelength(_)))
            ));
            assert!(matches!(
                set.update_angular_size("G1", value),
                Err(MeasurementError::Domain(DomainError::InvalidAngularSize(_)))
            ));
            assert!(matches!(
                set.update_distance("G1", value),
                Err(MeasurementError::Domain(DomainError::InvalidDistance(_)))
            ));
            assert!(matches!(
                set.update_velocity("G1", value),
                Err(MeasurementError::Domain(DomainError::NonFiniteReading(_)))
            ));
        }

        assert_eq!(set, before);
    }

    #[test]
    fn non_positive_angles_wavelengths_and_distances_are_rejected() {
        let mut set = MeasurementSet::new(Dataset::Student);
        set.ensure("G1");

        assert_eq!(
            set.update_angular_size("G1", -5.0).unwrap_err(),
            MeasurementError::Domain(DomainError::InvalidAngularSize(-5.0))
        );
        assert_eq!(
            set.update_angular_size("G1", 0.0).unwrap_err(),
            MeasurementError::Domain(DomainError::InvalidAngularSize(0.0))
        );
        assert_eq!(
            set.update_observed_wavelength("G1", -6563.0).unwrap_err(),
            MeasurementError::Domain(DomainError::InvalidWavelength(-6563.0))
        );
        assert_eq!(
            set.update_distance("G1", 0.0).unwrap_err(),
            MeasurementError::Domain(DomainError::InvalidDistance(0.0))
        );
        assert_eq!(*set.counters(), MeasurementCounters::default());
        assert!(set.get("G1").unwrap().ang_size_value.is_none());
    }

    #[test]
    fn negative_velocity_is_a_valid_blueshift() {
        let mut set = MeasurementSet::new(Dataset::Example);
        set.ensure("M31");

        let updated = set.update_velocity("M31", -300.0).unwrap();

        assert_eq!(updated.velocity_value, Some(-300.0));
        assert_eq!(set.counters().velocities, 1);
    }

    #[test]
    fn missing_record_wins_over_invalid_value() {
        let mut set = MeasurementSet::new(Dataset::Student);
        let err = set.update_angular_size("G404", f64::NAN).unwrap_err();
        assert!(matches!(err, MeasurementError::NotFound { .. }));
    }

    #[test]
    fn counter_increments_on_every_call() {
        let mut set = MeasurementSet::new(Dataset::Student);
        set.ensure("G1");
        set.update_angular_size("G1", 35.0).unwrap();
        set.update_angular_size("G1", 36.0).unwrap();

        assert_eq!(set.counters().angular_sizes, 2);
        assert_eq!(set.scanned_count(MeasurementKind::AngularSize), 1);
        assert_eq!(set.get("G1").unwrap().ang_size_value, Some(36.0));
    }

    #[test]
    fn seed_from_catalog_numbers_records_and_skips_duplicates() {
        let catalog = vec![galaxy("G1"), galaxy("G2"), galaxy("G1")];
        let set = MeasurementSet::seed_from_catalog(Dataset::Example, &catalog);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("G1").unwrap().measurement_number, Some(1));
        assert_eq!(set.get("G2").unwrap().measurement_number, Some(2));
        assert_eq!(set.get("G2").unwrap().galaxy, Some(galaxy("G2")));
    }

    #[test]
    fn all_have_is_false_for_empty_set() {
        let mut set = MeasurementSet::new(Dataset::Student);
        assert!(!set.all_have(MeasurementKind::AngularSize));

        set.ensure("G1");
        set.update_angular_size("G1", 20.0).unwrap();
        assert!(set.all_have(MeasurementKind::AngularSize));
    }

    #[test]
    fn set_preserves_insertion_order() {
        let mut set = MeasurementSet::new(Dataset::Student);
        for id in ["G3", "G1", "G2"] {
            set.ensure(id);
        }
        let ids: Vec<&str> = set.iter().map(|m| m.galaxy_id.as_str()).collect();
        assert_eq!(ids, vec!["G3", "G1", "G2"]);
    }
}
