//! Dense row-major matrix storage.
//!
//! `Matrix` is the container shared by every pipeline stage. It owns a contiguous
//! buffer with row-major layout: `data.len() == rows * cols`.

use crate::{Error, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "MatrixFields"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

/// Unchecked wire form; deserialization goes through [`Matrix::from_flat`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct MatrixFields {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<MatrixFields> for Matrix {
    type Error = Error;

    fn try_from(fields: MatrixFields) -> Result<Self> {
        Matrix::from_flat(fields.data, fields.rows, fields.cols)
    }
}

impl Matrix {
    /// All-zero matrix with shape `(rows, cols)`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build a matrix from a flat row-major buffer.
    pub fn from_flat(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::InvalidShape("matrix shape overflow".to_owned()))?;
        if data.len() != expected {
            return Err(Error::InvalidShape(format!(
                "buffer length {} does not match rows * cols ({rows} * {cols})",
                data.len()
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a matrix from per-row vectors.
    ///
    /// Every row must have the same length. An empty slice yields a `(0, 0)` matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Copy the selected rows (in the given order) into a new matrix.
    ///
    /// Panics if any index is `>= rows`.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &idx in indices {
            data.extend_from_slice(self.row(idx));
        }
        Self {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }

    /// Apply `f` to every element, returning a new matrix.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the `idx`-th row (shape: `(cols,)`).
    ///
    /// Panics if `idx >= rows`.
    #[inline]
    pub fn row(&self, idx: usize) -> &[f64] {
        assert!(idx < self.rows, "row {idx} out of bounds for {} rows", self.rows);
        let start = idx * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, idx: usize) -> &mut [f64] {
        let start = idx * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks_exact(0)` panics, and a zero-width matrix still has `rows` rows.
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Element at `(row, col)`.
    ///
    /// Panics if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.cols, "col {col} out of bounds for {} cols", self.cols);
        self.row(row)[col]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        let idx = row * self.cols + col;
        self.data[idx] = value;
    }

    /// Row-major view of the whole buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copy out as per-row vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    pub(crate) fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.cols);
        self.data.extend_from_slice(row);
        self.rows += 1;
    }
}
