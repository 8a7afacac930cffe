//! Model directory analysis.
//!
//! A model directory holds a newline-delimited label set and a tab-delimited
//! training table. The model is a regression when every label appears in the
//! training table's header row; otherwise it is a classifier.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ModelError, ModelResult};

/// Label file inside a model directory.
pub const LABELS_FILE: &str = "labels.txt";
/// Training table inside a model directory.
pub const TRAINING_FILE: &str = "training.tbl";
/// Parameter file inside a model directory.
pub const PARMS_FILE: &str = "parms.prm";

/// The two model flavors a directory can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Classifier,
    Regression,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classifier => write!(f, "CLASS"),
            Self::Regression => write!(f, "REGRESSION"),
        }
    }
}

/// An analyzed model directory.
#[derive(Debug, Clone)]
pub struct ModelDirectory {
    path: PathBuf,
    model_type: ModelType,
    labels: Vec<String>,
    headers: Vec<String>,
    record_count: usize,
}

impl ModelDirectory {
    /// Analyzes the directory at `path`.
    ///
    /// Requires the label file and the training table; reads the header row
    /// and counts the data records.
    pub fn analyze(path: impl Into<PathBuf>) -> ModelResult<Self> {
        let path = path.into();

        let labels_path = path.join(LABELS_FILE);
        if !labels_path.exists() {
            return Err(ModelError::MissingLabelsFile(labels_path));
        }
        let labels: Vec<String> = std::fs::read_to_string(&labels_path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();

        let training_path = path.join(TRAINING_FILE);
        if !training_path.exists() {
            return Err(ModelError::MissingTrainingFile(training_path));
        }
        let training = std::fs::read_to_string(&training_path)?;
        let mut lines = training.lines();
        let Some(header) = lines.next() else {
            return Err(ModelError::EmptyTrainingFile(training_path));
        };
        let headers: Vec<String> = header.split('\t').map(ToString::to_string).collect();
        let record_count = lines.count();

        // If every label appears in the header row, this is a regression
        // model; otherwise the labels are classes.
        let label_set: HashSet<&str> = labels.iter().map(String::as_str).collect();
        let present = headers.iter().filter(|h| label_set.contains(h.as_str())).count();
        let model_type = if present == labels.len() && !labels.is_empty() {
            ModelType::Regression
        } else {
            ModelType::Classifier
        };

        debug!(
            path = %path.display(),
            model_type = %model_type,
            labels = labels.len(),
            records = record_count,
            "Model directory analyzed"
        );
        Ok(Self { path, model_type, labels, headers, record_count })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data records in the training table.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Headers eligible as metadata columns: for a regression model the
    /// label columns are excluded, for a classifier every header qualifies.
    #[must_use]
    pub fn meta_candidate_headers(&self) -> Vec<String> {
        match self.model_type {
            ModelType::Classifier => self.headers.clone(),
            ModelType::Regression => {
                let label_set: HashSet<&str> = self.labels.iter().map(String::as_str).collect();
                self.headers
                    .iter()
                    .filter(|h| !label_set.contains(h.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }

    #[must_use]
    pub fn parm_file_path(&self) -> PathBuf {
        self.path.join(PARMS_FILE)
    }

    #[must_use]
    pub fn has_parm_file(&self) -> bool {
        self.parm_file_path().exists()
    }
}

/// Testing-set size seeded into a fresh parameter file: a tenth of the
/// records, floored at one.
#[must_use]
pub fn default_test_size(record_count: usize) -> usize {
    (record_count / 10).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_model_dir(labels: &str, training: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(LABELS_FILE), labels).unwrap();
        std::fs::write(temp.path().join(TRAINING_FILE), training).unwrap();
        temp
    }

    #[test]
    fn test_regression_when_all_labels_in_header() {
        let temp = write_model_dir(
            "growth\ndensity\n",
            "id\tgrowth\tdensity\tfeat1\nr1\t0.1\t0.2\t0.3\nr2\t0.4\t0.5\t0.6\n",
        );
        let model = ModelDirectory::analyze(temp.path()).unwrap();
        assert_eq!(model.model_type(), ModelType::Regression);
        assert_eq!(model.record_count(), 2);
        assert_eq!(model.meta_candidate_headers(), vec!["id".to_string(), "feat1".to_string()]);
    }

    #[test]
    fn test_classifier_when_labels_missing_from_header() {
        let temp = write_model_dir("yes\nno\n", "id\tfeat1\tclass\nr1\t0.1\tyes\n");
        let model = ModelDirectory::analyze(temp.path()).unwrap();
        assert_eq!(model.model_type(), ModelType::Classifier);
        assert_eq!(model.meta_candidate_headers().len(), 3);
    }

    #[test]
    fn test_partial_label_overlap_is_a_classifier() {
        let temp = write_model_dir("growth\ndensity\n", "id\tgrowth\tfeat1\nr1\t0.1\t0.2\n");
        let model = ModelDirectory::analyze(temp.path()).unwrap();
        assert_eq!(model.model_type(), ModelType::Classifier);
    }

    #[test]
    fn test_missing_files_are_reported() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            ModelDirectory::analyze(temp.path()),
            Err(ModelError::MissingLabelsFile(_))
        ));

        std::fs::write(temp.path().join(LABELS_FILE), "yes\n").unwrap();
        assert!(matches!(
            ModelDirectory::analyze(temp.path()),
            Err(ModelError::MissingTrainingFile(_))
        ));

        std::fs::write(temp.path().join(TRAINING_FILE), "").unwrap();
        assert!(matches!(
            ModelDirectory::analyze(temp.path()),
            Err(ModelError::EmptyTrainingFile(_))
        ));
    }

    #[test]
    fn test_default_test_size_floors_at_one() {
        assert_eq!(default_test_size(0), 1);
        assert_eq!(default_test_size(5), 1);
        assert_eq!(default_test_size(10), 1);
        assert_eq!(default_test_size(95), 9);
        assert_eq!(default_test_size(200), 20);
    }
}
