//! Confusion-matrix accumulation for classification models.

use crate::batch::{argmax, PredictionBatch};
use crate::partition::TrainingPartition;
use crate::report::{ErrorSummary, ValidationReport};

/// Which confusion matrix to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    /// Held-out testing records.
    Test,
    /// Records used for training.
    Train,
    /// Sum of the two, materialized by `finish_report`.
    All,
}

/// Square count matrix indexed `[output][expected]`.
#[derive(Debug, Clone, Default)]
struct Matrix {
    n_labels: usize,
    counts: Vec<u32>,
}

impl Matrix {
    fn zeroed(n_labels: usize) -> Self {
        Self { n_labels, counts: vec![0; n_labels * n_labels] }
    }

    fn get(&self, o: usize, e: usize) -> u32 {
        self.counts[o * self.n_labels + e]
    }

    fn bump(&mut self, o: usize, e: usize) {
        self.counts[o * self.n_labels + e] += 1;
    }
}

/// Streams prediction batches into training/testing confusion matrices.
///
/// For each record the expected and output labels are the argmax of the
/// record's vectors (ties to the lowest index); the record counts into the
/// training or testing matrix by partition membership. After
/// `finish_report`, `all[o][e] == test[o][e] + train[o][e]` for every pair.
#[derive(Debug)]
pub struct ConfusionAggregator {
    partition: TrainingPartition,
    test: Matrix,
    train: Matrix,
    all: Matrix,
    started: bool,
    finished: bool,
}

impl ConfusionAggregator {
    #[must_use]
    pub fn new(partition: TrainingPartition) -> Self {
        Self {
            partition,
            test: Matrix::default(),
            train: Matrix::default(),
            all: Matrix::default(),
            started: false,
            finished: false,
        }
    }

    /// Number of labels fixed by `start_report`.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.test.n_labels
    }

    /// Count for `(output, expected)` in the chosen matrix.
    ///
    /// # Panics
    /// Panics when called before `finish_report`, or with out-of-range
    /// label indices.
    #[must_use]
    pub fn count(&self, which: MatrixKind, o: usize, e: usize) -> u32 {
        assert!(self.finished, "count() read before finish_report()");
        match which {
            MatrixKind::Test => self.test.get(o, e),
            MatrixKind::Train => self.train.get(o, e),
            MatrixKind::All => self.all.get(o, e),
        }
    }
}

impl ValidationReport for ConfusionAggregator {
    fn start_report(&mut self, _meta_cols: &[String], labels: &[String]) {
        let n_labels = labels.len();
        self.test = Matrix::zeroed(n_labels);
        self.train = Matrix::zeroed(n_labels);
        self.all = Matrix::zeroed(n_labels);
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
            let e = argmax(expected.row(r));
            let o = argmax(output.row(r));
            if self.partition.is_training(id) {
                self.train.bump(o, e);
            } else {
                self.test.bump(o, e);
            }
        }
    }

    fn finish_report(&mut self, _errors: &ErrorSummary) {
        assert!(self.started, "finish_report() before start_report()");
        for o in 0..self.all.n_labels {
            for e in 0..self.all.n_labels {
                self.all.counts[o * self.all.n_labels + e] =
                    self.test.get(o, e) + self.train.get(o, e);
            }
        }
        self.finished = true;
    }
}
