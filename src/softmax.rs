//! Row-wise softmax.
//!
//! Each row is shifted by its maximum before exponentiating, so large scores do
//! not overflow and the result is invariant to adding a constant to a row.

use crate::{Error, Matrix, Result};

/// Softmax over each row of a `(N, K)` score matrix.
///
/// Fails if rows are empty (`K == 0` with `N > 0`).
pub fn softmax(scores: &Matrix) -> Result<Matrix> {
    if scores.cols() == 0 && scores.rows() > 0 {
        return Err(Error::InvalidShape(
            "softmax requires at least one column".to_owned(),
        ));
    }
    let mut out = scores.clone();
    for i in 0..out.rows() {
        softmax_in_place(out.row_mut(i));
    }
    Ok(out)
}

/// Softmax of a single score vector.
pub fn softmax_vector(scores: &[f64]) -> Result<Vec<f64>> {
    if scores.is_empty() {
        return Err(Error::InvalidShape(
            "softmax requires at least one score".to_owned(),
        ));
    }
    let mut out = scores.to_vec();
    softmax_in_place(&mut out);
    Ok(out)
}

#[inline]
fn softmax_in_place(row: &mut [f64]) {
    debug_assert!(!row.is_empty());
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0_f64;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    let inv_sum = 1.0 / sum;
    for v in row.iter_mut() {
        *v *= inv_sum;
    }
}
