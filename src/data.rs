//! Labelled datasets.
//!
//! A [`Dataset`] pairs an `(N, M)` feature matrix with `N` integer labels in
//! `[0, num_classes)`. Construction validates both invariants once, so every
//! later stage can index rows and labels without re-checking.

use crate::{Error, Matrix, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    labels: Vec<usize>,
    num_classes: usize,
}

impl Dataset {
    /// Build a dataset from a feature matrix and labels.
    pub fn new(features: Matrix, labels: Vec<usize>, num_classes: usize) -> Result<Self> {
        if num_classes == 0 {
            return Err(Error::InvalidConfig("num_classes must be > 0".to_owned()));
        }
        if features.rows() != labels.len() {
            return Err(Error::mismatch(
                "dataset",
                features.shape(),
                (labels.len(), 1),
            ));
        }
        if let Some(&label) = labels.iter().find(|&&l| l >= num_classes) {
            return Err(Error::LabelOutOfRange { label, num_classes });
        }
        if let Some(pos) = features.as_slice().iter().position(|v| !v.is_finite()) {
            let cols = features.cols().max(1);
            return Err(Error::InvalidData(format!(
                "feature ({}, {}) is not finite",
                pos / cols,
                pos % cols
            )));
        }

        Ok(Self {
            features,
            labels,
            num_classes,
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(rows: &[Vec<f64>], labels: &[usize], num_classes: usize) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if rows[0].is_empty() {
            return Err(Error::InvalidData("feature count must be > 0".to_owned()));
        }
        let features = Matrix::from_rows(rows)?;
        Self::new(features, labels.to_vec(), num_classes)
    }

    /// Copy the selected samples into a new dataset with the same class count.
    ///
    /// Panics if any index is `>= len`.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            num_classes: self.num_classes,
        }
    }

    /// Same labels, transformed features.
    pub(crate) fn with_features(&self, features: Matrix) -> Result<Self> {
        if features.rows() != self.labels.len() {
            return Err(Error::mismatch(
                "dataset",
                features.shape(),
                (self.labels.len(), 1),
            ));
        }
        Ok(Self {
            features,
            labels: self.labels.clone(),
            num_classes: self.num_classes,
        })
    }

    /// Append one sample.
    ///
    /// The vector must have exactly `num_features()` finite entries.
    pub fn push(&mut self, features: &[f64], label: usize) -> Result<()> {
        if features.len() != self.num_features() {
            return Err(Error::InvalidConfig(format!(
                "feature vector has len {}, expected {}",
                features.len(),
                self.num_features()
            )));
        }
        if label >= self.num_classes {
            return Err(Error::LabelOutOfRange {
                label,
                num_classes: self.num_classes,
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "feature vector contains non-finite values".to_owned(),
            ));
        }
        self.features.push_row(features);
        self.labels.push(label);
        Ok(())
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.cols()
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    #[inline]
    pub fn features(&self) -> &Matrix {
        &self.features
    }

    #[inline]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of samples per class.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

/// A paired train/test partition of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    pub train: Dataset,
    pub test: Dataset,
}
