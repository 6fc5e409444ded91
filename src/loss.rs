//! Loss functions.
//!
//! Gradient descent in [`crate::model`] uses the closed-form softmax gradient
//! directly; the loss value is only reported (see [`crate::FitReport`]).

use crate::{Error, Matrix, Result};

/// Smallest probability fed into `ln` so a confident miss stays finite.
const MIN_PROBABILITY: f64 = 1e-300;

/// Mean softmax cross-entropy of class probabilities against integer labels.
///
/// `probabilities` is `(N, K)` with rows summing to 1. Returns
/// `-mean(ln p[i][labels[i]])`, and `0.0` for an empty batch.
pub fn cross_entropy(probabilities: &Matrix, labels: &[usize]) -> Result<f64> {
    if probabilities.rows() != labels.len() {
        return Err(Error::mismatch(
            "cross_entropy",
            probabilities.shape(),
            (labels.len(), 1),
        ));
    }
    if labels.is_empty() {
        return Ok(0.0);
    }

    let num_classes = probabilities.cols();
    let mut sum = 0.0_f64;
    for (row, &label) in probabilities.iter_rows().zip(labels) {
        if label >= num_classes {
            return Err(Error::LabelOutOfRange { label, num_classes });
        }
        sum -= row[label].max(MIN_PROBABILITY).ln();
    }
    Ok(sum / labels.len() as f64)
}
