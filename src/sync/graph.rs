//! Linked datasets used for plotting measurements of several sources together.

use crate::core::{Measurement, MeasurementKind, MeasurementSet};
use thiserror::Error;

pub const STUDENT_DATA_LABEL: &str = "student_measurements";
pub const EXAMPLE_DATA_LABEL: &str = "example_measurements";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("No dataset labelled '{0}'")]
    UnknownDataset(String),

    #[error("Dataset '{0}' already exists")]
    DuplicateDataset(String),
}

/// One named table of measurement rows.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedDataset {
    pub label: String,
    pub rows: Vec<Measurement>,
}

impl LinkedDataset {
    /// Rows with a reading of `kind`, paired with that reading.
    pub fn values(&self, kind: MeasurementKind) -> Vec<(&str, f64)> {
        self.rows
            .iter()
            .filter_map(|m| reading(m, kind).map(|v| (m.galaxy_id.as_str(), v)))
            .collect()
    }
}

/// Declares that a field of one dataset means the same as a field of another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLink {
    pub from: (String, MeasurementKind),
    pub to: (String, MeasurementKind),
}

/// Per-session collection of linked datasets.
///
/// Grows only by appending datasets and links. Rows of an existing dataset
/// may be refreshed from the measurement set it mirrors.
#[derive(Clone, Debug, Default)]
pub struct DataCollection {
    datasets: Vec<LinkedDataset>,
    links: Vec<FieldLink>,
}

impl DataCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection with one dataset per measurement set, each field linked
    /// to the same field of the other sets.
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a MeasurementSet>) -> Self {
        let mut collection = Self::new();
        let mut labels = Vec::new();
        for set in sets {
            let label = label_for(set);
            if collection.add_dataset(label, set.as_slice().to_vec()).is_ok() {
                labels.push(label);
            }
        }
        for pair in labels.windows(2) {
            for kind in MeasurementKind::ALL {
                collection.push_link((pair[0], kind), (pair[1], kind));
            }
        }
        collection
    }

    pub fn add_dataset(
        &mut self,
        label: &str,
        rows: Vec<Measurement>,
    ) -> Result<&LinkedDataset, GraphError> {
        if self.get(label).is_some() {
            return Err(GraphError::DuplicateDataset(label.to_string()));
        }
        self.datasets.push(LinkedDataset {
            label: label.to_string(),
            rows,
        });
        tracing::debug!(label, "dataset added to collection");
        Ok(&self.datasets[self.datasets.len() - 1])
    }

    pub fn get(&self, label: &str) -> Option<&LinkedDataset> {
        self.datasets.iter().find(|d| d.label == label)
    }

    /// Replace the rows of the dataset mirroring `set`.
    ///
    /// Returns `false` when the collection has no such dataset yet.
    pub fn refresh_from(&mut self, set: &MeasurementSet) -> bool {
        let label = label_for(set);
        match self.datasets.iter_mut().find(|d| d.label == label) {
            Some(dataset) => {
                dataset.rows = set.as_slice().to_vec();
                true
            }
            None => {
                tracing::debug!(label, "refresh skipped, dataset not in collection");
                false
            }
        }
    }

    pub fn link(
        &mut self,
        from: (&str, MeasurementKind),
        to: (&str, MeasurementKind),
    ) -> Result<(), GraphError> {
        for label in [from.0, to.0] {
            if self.get(label).is_none() {
                return Err(GraphError::UnknownDataset(label.to_string()));
            }
        }
        self.push_link(from, to);
        Ok(())
    }

    fn push_link(&mut self, from: (&str, MeasurementKind), to: (&str, MeasurementKind)) {
        let link = FieldLink {
            from: (from.0.to_string(), from.1),
            to: (to.0.to_string(), to.1),
        };
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }

    /// Fields linked directly to `kind` of dataset `label`, in either direction.
    pub fn linked_fields(&self, label: &str, kind: MeasurementKind) -> Vec<(&str, MeasurementKind)> {
        self.links
            .iter()
            .filter_map(|link| {
                if link.from.0 == label && link.from.1 == kind {
                    Some((link.to.0.as_str(), link.to.1))
                } else if link.to.0 == label && link.to.1 == kind {
                    Some((link.from.0.as_str(), link.from.1))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.label.as_str())
    }

    pub fn links(&self) -> &[FieldLink] {
        &self.links
    }
}

fn label_for(set: &MeasurementSet) -> &'static str {
    match set.dataset() {
        crate::core::Dataset::Student => STUDENT_DATA_LABEL,
        crate::core::Dataset::Example => EXAMPLE_DATA_LABEL,
    }
}

fn reading(measurement: &Measurement, kind: MeasurementKind) -> Option<f64> {
    match kind {
        MeasurementKind::Wavelength => measurement.obs_wave_value,
        MeasurementKind::AngularSize => measurement.ang_size_value,
        MeasurementKind::Distance => measurement.est_dist_value,
        MeasurementKind::Velocity => measurement.velocity_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;

    fn sets() -> (MeasurementSet, MeasurementSet) {
        let mut student = MeasurementSet::new(Dataset::Student);
        student.ensure("G1");
        student.ensure("G2");
        student.update_distance("G2", 180.0).unwrap();
        let mut example = MeasurementSet::new(Dataset::Example);
        example.ensure("E1");
        (student, example)
    }

    #[test]
    fn collection_mirrors_sets_and_links_fields() {
        let (student, example) = sets();
        let collection = DataCollection::from_sets([&student, &example]);

        assert_eq!(
            collection.labels().collect::<Vec<_>>(),
            vec![STUDENT_DATA_LABEL, EXAMPLE_DATA_LABEL]
        );
        assert_eq!(collection.links().len(), MeasurementKind::ALL.len());
        assert_eq!(
            collection.linked_fields(EXAMPLE_DATA_LABEL, MeasurementKind::Distance),
            vec![(STUDENT_DATA_LABEL, MeasurementKind::Distance)]
        );

        let values = collection
            .get(STUDENT_DATA_LABEL)
            .map(|d| d.values(MeasurementKind::Distance));
        assert_eq!(values, Some(vec![("G2", 180.0)]));
    }

    #[test]
    fn missing_dataset_lookup_is_none() {
        let collection = DataCollection::new();
        assert!(collection.get(EXAMPLE_DATA_LABEL).is_none());
    }

    #[test]
    fn datasets_are_append_only() {
        let mut collection = DataCollection::new();
        collection.add_dataset("hubble_1929", Vec::new()).unwrap();

        let err = collection.add_dataset("hubble_1929", Vec::new()).unwrap_err();

        assert_eq!(err, GraphError::DuplicateDataset("hubble_1929".to_string()));
    }

    #[test]
    fn refresh_updates_existing_rows_only() {
        let (mut student, example) = sets();
        let mut collection = DataCollection::from_sets([&student]);

        student.update_angular_size("G1", 44.0).unwrap();
        assert!(collection.refresh_from(&student));
        assert!(!collection.refresh_from(&example));

        let rows = &collection.get(STUDENT_DATA_LABEL).unwrap().rows;
        assert_eq!(rows[0].ang_size_value, Some(44.0));
    }

    #[test]
    fn collection_links_are_not_duplicated() {
        let (student, example) = sets();
        let mut collection = DataCollection::from_sets([&student, &example]);

        collection
            .link(
                (STUDENT_DATA_LABEL, MeasurementKind::Velocity),
                (EXAMPLE_DATA_LABEL, MeasurementKind::Velocity),
            )
            .unwrap();

        assert_eq!(collection.links().len(), MeasurementKind::ALL.len());
    }

    #[test]
    fn link_requires_both_datasets() {
        let mut collection = DataCollection::new();
        collection.add_dataset("hubble_key", Vec::new()).unwrap();

        let err = collection
            .link(("hubble_key", MeasurementKind::Distance), ("class", MeasurementKind::Distance))
            .unwrap_err();

        assert_eq!(err, GraphError::UnknownDataset("class".to_string()));
        assert!(collection.links().is_empty());
    }
}
