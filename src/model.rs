//! Multinomial (softmax) logistic regression.
//!
//! A model only exists once trained: [`LogisticRegression::fit`] runs batch
//! gradient descent to completion and returns the trained parameters. Weights
//! are `(num_classes, num_features)`, biases are `(num_classes,)`.
//!
//! Each iteration:
//!
//! - `scores = X W^T + b`
//! - `P = softmax(scores)`
//! - `D = P - one_hot(y)`
//! - `dW = D^T X / N + (lambda / N) W`, `db = mean over rows of D`
//! - `W -= lr * dW`, `b -= lr * db`
//!
//! Training stops early once the largest absolute gradient component is below
//! the tolerance. Reaching `max_iter` first is not an error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::linalg::{
    add_row_broadcast, add_vector, arg_max, multiply_transposed, multiply_vector, one_hot,
    transposed_multiply,
};
use crate::softmax::{softmax, softmax_vector};
use crate::{Error, Matrix, Result, loss};

/// Learning rate used when none is configured.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Training hyperparameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    /// L2 penalty, `>= 0`.
    pub lambda: f64,
    /// Convergence tolerance on the max absolute gradient, `> 0`.
    pub tolerance: f64,
    /// Iteration cap, `>= 1`.
    pub max_iter: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            lambda: 1e-4,
            tolerance: 1e-4,
            max_iter: 300,
        }
    }
}

impl Hyperparameters {
    pub fn new(lambda: f64, tolerance: f64, max_iter: usize) -> Result<Self> {
        let hp = Self {
            lambda,
            tolerance,
            max_iter,
        };
        hp.validate()?;
        Ok(hp)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lambda must be finite and >= 0, got {}",
                self.lambda
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidConfig("max_iter must be > 0".to_owned()));
        }
        Ok(())
    }
}

/// How gradient descent ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// Iterations performed (`1..=max_iter`).
    pub iterations: usize,
    /// True if the gradient fell below the tolerance before the cap.
    pub converged: bool,
    /// Mean cross-entropy on the training data with the final parameters.
    pub final_loss: f64,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Matrix,
    biases: Vec<f64>,
    hyperparameters: Hyperparameters,
    report: FitReport,
}

impl LogisticRegression {
    /// Train on `features` `(N, M)` and `labels` `(N,)`.
    ///
    /// Parameters start at zero, so training is deterministic.
    pub fn fit(
        features: &Matrix,
        labels: &[usize],
        num_classes: usize,
        hyperparameters: Hyperparameters,
        learning_rate: f64,
    ) -> Result<Self> {
        hyperparameters.validate()?;
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {learning_rate}"
            )));
        }
        if num_classes == 0 {
            return Err(Error::InvalidConfig("num_classes must be > 0".to_owned()));
        }
        if features.rows() == 0 {
            return Err(Error::InvalidData(
                "training set must not be empty".to_owned(),
            ));
        }
        if features.rows() != labels.len() {
            return Err(Error::mismatch("fit", features.shape(), (labels.len(), 1)));
        }

        let n = features.rows() as f64;
        let targets = one_hot(labels, num_classes)?;
        let mut weights = Matrix::zeros(num_classes, features.cols());
        let mut biases = vec![0.0_f64; num_classes];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < hyperparameters.max_iter {
            iterations += 1;

            let scores = add_row_broadcast(&multiply_transposed(features, &weights)?, &biases)?;
            let mut delta = softmax(&scores)?;
            for (d, &t) in delta.as_mut_slice().iter_mut().zip(targets.as_slice()) {
                *d -= t;
            }

            let mut grad_w = transposed_multiply(&delta, features)?;
            let penalty = hyperparameters.lambda / n;
            for (g, &w) in grad_w.as_mut_slice().iter_mut().zip(weights.as_slice()) {
                *g = *g / n + penalty * w;
            }

            let mut grad_b = vec![0.0_f64; num_classes];
            for row in delta.iter_rows() {
                for (g, &d) in grad_b.iter_mut().zip(row) {
                    *g += d;
                }
            }
            for g in &mut grad_b {
                *g /= n;
            }

            for (w, &g) in weights.as_mut_slice().iter_mut().zip(grad_w.as_slice()) {
                *w -= learning_rate * g;
            }
            for (b, &g) in biases.iter_mut().zip(&grad_b) {
                *b -= learning_rate * g;
            }

            let max_grad = grad_w
                .as_slice()
                .iter()
                .chain(&grad_b)
                .fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if max_grad < hyperparameters.tolerance {
                converged = true;
                break;
            }
        }

        let scores = add_row_broadcast(&multiply_transposed(features, &weights)?, &biases)?;
        let final_loss = loss::cross_entropy(&softmax(&scores)?, labels)?;

        if converged {
            tracing::debug!(iterations, final_loss, "gradient descent converged");
        } else {
            tracing::debug!(iterations, final_loss, "gradient descent hit max_iter");
        }

        Ok(Self {
            weights,
            biases,
            hyperparameters,
            report: FitReport {
                iterations,
                converged,
                final_loss,
            },
        })
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.biases.len()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.weights.cols()
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    #[inline]
    pub fn hyperparameters(&self) -> Hyperparameters {
        self.hyperparameters
    }

    #[inline]
    pub fn report(&self) -> FitReport {
        self.report
    }

    /// Raw class scores `W x + b`.
    pub fn logits(&self, x: &[f64]) -> Result<Vec<f64>> {
        add_vector(&multiply_vector(&self.weights, x)?, &self.biases)
    }

    /// Class probabilities for one sample.
    pub fn probabilities(&self, x: &[f64]) -> Result<Vec<f64>> {
        softmax_vector(&self.logits(x)?)
    }

    /// Predicted class for one sample.
    pub fn predict(&self, x: &[f64]) -> Result<usize> {
        arg_max(&self.logits(x)?)
    }

    /// Predicted class for every row of `features`.
    pub fn predict_batch(&self, features: &Matrix) -> Result<Vec<usize>> {
        if features.cols() != self.num_features() {
            return Err(Error::mismatch(
                "predict_batch",
                features.shape(),
                self.weights.shape(),
            ));
        }
        features.iter_rows().map(|x| self.predict(x)).collect()
    }
}
