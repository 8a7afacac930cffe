//! Per-record prediction accumulation for regression scatter plots.

use std::collections::BTreeMap;

use crate::batch::PredictionBatch;
use crate::partition::TrainingPartition;
use crate::report::{ErrorSummary, ValidationReport};

/// Expected and output vectors for a single record.
///
/// Values are copied out of the incoming batches at ingestion time: the
/// caller may reuse its batch buffers between calls, so holding a reference
/// into them would silently corrupt earlier records.
#[derive(Debug, Clone, PartialEq)]
struct Prediction {
    expected: Vec<f64>,
    output: Vec<f64>,
}

/// One point of a scatter series for a particular label column.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub id: String,
    pub expected: f64,
    pub output: f64,
}

/// Streams prediction batches into an id-keyed map for later plotting.
///
/// Each id appears at most once; the latest report for an id overwrites any
/// prior entry.
#[derive(Debug)]
pub struct ScatterAggregator {
    partition: TrainingPartition,
    predictions: BTreeMap<String, Prediction>,
    started: bool,
    finished: bool,
}

impl ScatterAggregator {
    #[must_use]
    pub fn new(partition: TrainingPartition) -> Self {
        Self {
            partition,
            predictions: BTreeMap::new(),
            started: false,
            finished: false,
        }
    }

    /// Number of distinct records reported.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.predictions.len()
    }

    /// The training or testing series for one label column, ordered by id.
    ///
    /// # Panics
    /// Panics when called before `finish_report`, or when `label_index` is
    /// out of range for a stored record.
    #[must_use]
    pub fn series_for(&self, label_index: usize, training: bool) -> Vec<ScatterPoint> {
        assert!(self.finished, "series_for() read before finish_report()");
        self.predictions
            .iter()
            .filter(|(id, _)| self.partition.is_training(id) == training)
            .map(|(id, prediction)| ScatterPoint {
                id: id.clone(),
                expected: prediction.expected[label_index],
                output: prediction.output[label_index],
            })
            .collect()
    }
}

impl ValidationReport for ScatterAggregator {
    fn start_report(&mut self, _meta_cols: &[String], _labels: &[String]) {
        self.predictions.clear();
        self.started = true;
        self.finished = false;
    }

    fn report_output(
        &mut self,
        ids: &[String],
        expected: &PredictionBatch,
        output: &PredictionBatch,
    ) {
        assert!(self.started, "report_output() before start_report()");
        for (r, id) in ids.iter().enumerate() {
            let prediction = Prediction {
                expected: expected.row(r).to_vec(),
                output: output.row(r).to_vec(),
            };
            self.predictions.insert(id.clone(), prediction);
        }
    }

    fn finish_report(&mut self, _errors: &ErrorSummary) {
        assert!(self.started, "finish_report() before start_report()");
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn started_aggregator(partition: TrainingPartition) -> ScatterAggregator {
        let mut aggregator = ScatterAggregator::new(partition);
        aggregator.start_report(&[], &[]);
        aggregator
    }

    #[test]
    fn test_latest_report_for_an_id_wins() {
        let mut aggregator = started_aggregator(TrainingPartition::default());

        let first = PredictionBatch::from_rows(&[vec![1.0], vec![2.0]]);
        aggregator.report_output(&ids(&["r1", "r2"]), &first, &first);

        let second = PredictionBatch::from_rows(&[vec![9.0]]);
        aggregator.report_output(&ids(&["r1"]), &second, &second);
        aggregator.finish_report(&ErrorSummary::default());

        let series = aggregator.series_for(0, false);
        assert_eq!(series.len(), 2);
        let r1 = series.iter().find(|p| p.id == "r1").unwrap();
        assert_eq!(r1.expected, 9.0);
        assert_eq!(aggregator.record_count(), 2);
    }

    #[test]
    fn test_series_partition_is_disjoint_and_complete() {
        let partition = TrainingPartition::from_ids(["r1", "r3"]);
        let mut aggregator = started_aggregator(partition);

        let expected = PredictionBatch::from_rows(&[vec![0.1], vec![0.2], vec![0.3]]);
        let output = PredictionBatch::from_rows(&[vec![1.1], vec![1.2], vec![1.3]]);
        aggregator.report_output(&ids(&["r1", "r2", "r3"]), &expected, &output);
        aggregator.finish_report(&ErrorSummary::default());

        let training: Vec<_> =
            aggregator.series_for(0, true).into_iter().map(|p| p.id).collect();
        let testing: Vec<_> =
            aggregator.series_for(0, false).into_iter().map(|p| p.id).collect();

        assert_eq!(training, vec!["r1".to_string(), "r3".to_string()]);
        assert_eq!(testing, vec!["r2".to_string()]);
        assert!(training.iter().all(|id| !testing.contains(id)));
        assert_eq!(training.len() + testing.len(), aggregator.record_count());
    }

    #[test]
    fn test_values_survive_caller_buffer_reuse() {
        let mut aggregator = started_aggregator(TrainingPartition::default());

        let mut batch = PredictionBatch::from_rows(&[vec![0.25, 0.75]]);
        aggregator.report_output(&ids(&["r1"]), &batch, &batch);

        // The caller reuses its buffer for the next record.
        batch.set_row(0, &[0.99, 0.01]);
        aggregator.report_output(&ids(&["r2"]), &batch, &batch);
        aggregator.finish_report(&ErrorSummary::default());

        let series = aggregator.series_for(1, false);
        let r1 = series.iter().find(|p| p.id == "r1").unwrap();
        assert_eq!(r1.expected, 0.75, "stored values must not alias the reused buffer");
        let r2 = series.iter().find(|p| p.id == "r2").unwrap();
        assert_eq!(r2.expected, 0.01);
    }

    #[test]
    fn test_start_report_resets_the_map() {
        let mut aggregator = started_aggregator(TrainingPartition::default());
        let batch = PredictionBatch::from_rows(&[vec![1.0]]);
        aggregator.report_output(&ids(&["r1"]), &batch, &batch);

        aggregator.start_report(&[], &[]);
        aggregator.finish_report(&ErrorSummary::default());
        assert_eq!(aggregator.record_count(), 0);
    }

    #[test]
    #[should_panic(expected = "before finish_report")]
    fn test_read_before_finish_panics() {
        let aggregator = started_aggregator(TrainingPartition::default());
        let _ = aggregator.series_for(0, true);
    }
}
