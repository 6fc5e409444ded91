//! Multi-class evaluation metrics.
//!
//! Metrics are evaluation helpers (they do not participate in training). A
//! [`Metrics`] value is built once from true and predicted labels; everything
//! else is derived from its confusion matrix.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// `K x K` counts, row = actual class, column = predicted class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    num_classes: usize,
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[usize], predicted: &[usize], num_classes: usize) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(Error::mismatch(
                "confusion_matrix",
                (actual.len(), 1),
                (predicted.len(), 1),
            ));
        }
        let mut counts = vec![0; num_classes * num_classes];
        for (&a, &p) in actual.iter().zip(predicted) {
            for label in [a, p] {
                if label >= num_classes {
                    return Err(Error::LabelOutOfRange { label, num_classes });
                }
            }
            counts[a * num_classes + p] += 1;
        }
        Ok(Self {
            num_classes,
            counts,
        })
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Count of samples of class `actual` predicted as `predicted`.
    ///
    /// Panics if either index is `>= num_classes`.
    #[inline]
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        assert!(actual < self.num_classes && predicted < self.num_classes);
        self.counts[actual * self.num_classes + predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    #[inline]
    pub fn true_positives(&self, class: usize) -> usize {
        self.get(class, class)
    }

    /// Other classes predicted as `class` (column sum minus the diagonal).
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.num_classes)
            .filter(|&i| i != class)
            .map(|i| self.get(i, class))
            .sum()
    }

    /// `class` predicted as something else (row sum minus the diagonal).
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.num_classes)
            .filter(|&j| j != class)
            .map(|j| self.get(class, j))
            .sum()
    }

    pub fn true_negatives(&self, class: usize) -> usize {
        self.total()
            - self.true_positives(class)
            - self.false_positives(class)
            - self.false_negatives(class)
    }

    /// True-label occurrences of `class`.
    pub fn support(&self, class: usize) -> usize {
        (0..self.num_classes).map(|j| self.get(class, j)).sum()
    }
}

/// How per-class metrics are combined into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Averaging {
    /// Each class weighted by its support, divided by the sample count.
    #[default]
    Weighted,
    /// Unweighted mean over classes. Not implemented.
    Macro,
    /// Global TP/FP/FN counts. Not implemented.
    Micro,
}

/// Per-class breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Headline numbers reported for a trained model, each in `[0, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSummary {
    pub accuracy: f64,
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
}

#[derive(Debug, Clone)]
pub struct Metrics {
    confusion: ConfusionMatrix,
    sample_size: usize,
}

impl Metrics {
    /// Evaluate `predicted` against `actual`. Both must be non-empty and of equal length.
    pub fn new(actual: &[usize], predicted: &[usize], num_classes: usize) -> Result<Self> {
        if actual.is_empty() {
            return Err(Error::InvalidData(
                "cannot evaluate an empty label set".to_owned(),
            ));
        }
        let confusion = ConfusionMatrix::from_labels(actual, predicted, num_classes)?;
        Ok(Self {
            confusion,
            sample_size: actual.len(),
        })
    }

    #[inline]
    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.confusion.num_classes()
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.num_classes())
            .map(|c| self.confusion.true_positives(c))
            .sum();
        correct as f64 / self.sample_size as f64
    }

    /// `TP / (TP + FP)`, or 0 when the class is never predicted.
    pub fn class_precision(&self, class: usize) -> f64 {
        ratio(
            self.confusion.true_positives(class),
            self.confusion.false_positives(class),
        )
    }

    /// `TP / (TP + FN)`, or 0 when the class has no support.
    pub fn class_recall(&self, class: usize) -> f64 {
        ratio(
            self.confusion.true_positives(class),
            self.confusion.false_negatives(class),
        )
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub fn class_f1(&self, class: usize) -> f64 {
        let p = self.class_precision(class);
        let r = self.class_recall(class);
        if p + r == 0.0 {
            tracing::trace!(class, "F1 undefined (precision + recall == 0), using 0");
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    pub fn per_class(&self) -> Vec<ClassMetrics> {
        (0..self.num_classes())
            .map(|c| ClassMetrics {
                precision: self.class_precision(c),
                recall: self.class_recall(c),
                f1: self.class_f1(c),
                support: self.confusion.support(c),
            })
            .collect()
    }

    pub fn precision(&self, averaging: Averaging) -> Result<f64> {
        self.average(averaging, |c| self.class_precision(c))
    }

    pub fn recall(&self, averaging: Averaging) -> Result<f64> {
        self.average(averaging, |c| self.class_recall(c))
    }

    pub fn f1(&self, averaging: Averaging) -> Result<f64> {
        self.average(averaging, |c| self.class_f1(c))
    }

    /// Accuracy plus weighted precision, recall and F1.
    pub fn summary(&self) -> Result<MetricsSummary> {
        Ok(MetricsSummary {
            accuracy: self.accuracy(),
            recall: self.recall(Averaging::Weighted)?,
            precision: self.precision(Averaging::Weighted)?,
            f1: self.f1(Averaging::Weighted)?,
        })
    }

    fn average(&self, averaging: Averaging, metric: impl Fn(usize) -> f64) -> Result<f64> {
        match averaging {
            Averaging::Weighted => {
                let total: f64 = (0..self.num_classes())
                    .map(|c| metric(c) * self.confusion.support(c) as f64)
                    .sum();
                Ok(total / self.sample_size as f64)
            }
            Averaging::Macro | Averaging::Micro => Err(Error::Unimplemented(format!(
                "{averaging:?} averaging is not implemented"
            ))),
        }
    }
}

#[inline]
fn ratio(tp: usize, other: usize) -> f64 {
    let denom = tp + other;
    if denom == 0 {
        0.0
    } else {
        tp as f64 / denom as f64
    }
}
