//! Dense linear-algebra kernel.
//!
//! Every operation is pure: inputs are borrowed and a new container is returned.
//! Binary operations validate conformable shapes and fail with
//! [`Error::DimensionMismatch`] instead of truncating or padding.

use crate::matmul::{self, Op, Operand};
use crate::{Error, Matrix, Result};

#[inline]
fn vector_shape(v: &[f64]) -> (usize, usize) {
    (v.len(), 1)
}

/// Matrix product `A * B`.
///
/// Requires `a.cols() == b.rows()`; the result has shape `(a.rows(), b.cols())`.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    product("multiply", Operand::new(a, Op::AsIs), Operand::new(b, Op::AsIs))
}

/// `A * B^T` without building `B^T`. Requires `a.cols() == b.cols()`.
pub fn multiply_transposed(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    product(
        "multiply_transposed",
        Operand::new(a, Op::AsIs),
        Operand::new(b, Op::Transposed),
    )
}

/// `A^T * B` without building `A^T`. Requires `a.rows() == b.rows()`.
pub fn transposed_multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    product(
        "transposed_multiply",
        Operand::new(a, Op::Transposed),
        Operand::new(b, Op::AsIs),
    )
}

fn product(op: &'static str, lhs: Operand<'_>, rhs: Operand<'_>) -> Result<Matrix> {
    if lhs.shape().1 != rhs.shape().0 {
        return Err(Error::mismatch(op, lhs.shape(), rhs.shape()));
    }
    Ok(matmul::product(lhs, rhs))
}

/// Matrix-vector product `A * x`.
pub fn multiply_vector(a: &Matrix, x: &[f64]) -> Result<Vec<f64>> {
    if a.cols() != x.len() {
        return Err(Error::mismatch("multiply_vector", a.shape(), vector_shape(x)));
    }
    let mut out = Vec::with_capacity(a.rows());
    for row in a.iter_rows() {
        out.push(dot_unchecked(row, x));
    }
    Ok(out)
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::mismatch("dot", vector_shape(a), vector_shape(b)));
    }
    Ok(dot_unchecked(a, b))
}

#[inline]
fn dot_unchecked(a: &[f64], b: &[f64]) -> f64 {
    let mut acc = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        acc = x.mul_add(y, acc);
    }
    acc
}

/// `s * v`.
pub fn scale_vector(s: f64, v: &[f64]) -> Vec<f64> {
    v.iter().map(|&x| s * x).collect()
}

/// `s * A`.
pub fn scale(s: f64, a: &Matrix) -> Matrix {
    a.map(|x| s * x)
}

/// Transpose: `(rows, cols)` becomes `(cols, rows)`.
pub fn transpose(a: &Matrix) -> Matrix {
    let mut out = Matrix::zeros(a.cols(), a.rows());
    for (i, row) in a.iter_rows().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            out.set(j, i, v);
        }
    }
    out
}

/// Element-wise vector sum.
pub fn add_vector(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(Error::mismatch("add_vector", vector_shape(a), vector_shape(b)));
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| x + y).collect())
}

/// Element-wise matrix sum. Shapes must match exactly.
pub fn add(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.shape() != b.shape() {
        return Err(Error::mismatch("add", a.shape(), b.shape()));
    }
    let data = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| x + y)
        .collect();
    Matrix::from_flat(data, a.rows(), a.cols())
}

/// Add `v` to every row of `a` (bias broadcast).
pub fn add_row_broadcast(a: &Matrix, v: &[f64]) -> Result<Matrix> {
    if a.cols() != v.len() {
        return Err(Error::mismatch("add_row_broadcast", a.shape(), vector_shape(v)));
    }
    let mut out = a.clone();
    for i in 0..out.rows() {
        for (x, &b) in out.row_mut(i).iter_mut().zip(v) {
            *x += b;
        }
    }
    Ok(out)
}

/// Index of the largest element.
///
/// Ties resolve to the lowest index: the scan only moves on a strictly greater value.
pub fn arg_max(v: &[f64]) -> Result<usize> {
    if v.is_empty() {
        return Err(Error::InvalidShape("arg_max of an empty vector".to_owned()));
    }
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] {
            best = i;
        }
    }
    Ok(best)
}

/// One-hot encode `labels` into a `(labels.len(), num_classes)` matrix.
pub fn one_hot(labels: &[usize], num_classes: usize) -> Result<Matrix> {
    let mut out = Matrix::zeros(labels.len(), num_classes);
    for (i, &label) in labels.iter().enumerate() {
        if label >= num_classes {
            return Err(Error::LabelOutOfRange { label, num_classes });
        }
        out.set(i, label, 1.0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn multiply_matches_hand_computed_product() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]);
        let c = multiply(&a, &b).unwrap();
        assert_eq!(c, m(&[&[58.0, 64.0], &[139.0, 154.0]]));
    }

    #[test]
    fn multiply_rejects_inner_dimension_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        let err = multiply(&a, &b).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                op: "multiply",
                left: (2, 3),
                right: (2, 3)
            }
        );
    }

    #[test]
    fn transposed_products_match_explicit_transpose() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[&[1.0, 0.0, -1.0], &[2.0, 1.0, 0.0]]);
        assert_eq!(
            multiply_transposed(&a, &b).unwrap(),
            multiply(&a, &transpose(&b)).unwrap()
        );
        assert_eq!(
            transposed_multiply(&a, &b).unwrap(),
            multiply(&transpose(&a), &b).unwrap()
        );
        assert_eq!(
            transposed_multiply(&a, &Matrix::zeros(3, 1)).unwrap_err(),
            Error::DimensionMismatch {
                op: "transposed_multiply",
                left: (3, 2),
                right: (3, 1)
            }
        );
    }

    #[test]
    fn multiply_vector_and_dot() {
        let a = m(&[&[1.0, 0.0], &[0.0, 2.0], &[1.0, 1.0]]);
        assert_eq!(multiply_vector(&a, &[3.0, 4.0]).unwrap(), vec![3.0, 8.0, 7.0]);
        assert!(multiply_vector(&a, &[1.0]).is_err());

        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert!(dot(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn add_requires_identical_shapes() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[0.5, 0.5], &[0.5, 0.5]]);
        assert_eq!(add(&a, &b).unwrap(), m(&[&[1.5, 2.5], &[3.5, 4.5]]));
        assert!(add(&a, &Matrix::zeros(2, 3)).is_err());
        assert!(add_vector(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn scaling_and_broadcast() {
        let a = m(&[&[1.0, -2.0]]);
        assert_eq!(scale(-1.0, &a), m(&[&[-1.0, 2.0]]));
        assert_eq!(scale_vector(2.0, &[1.0, 3.0]), vec![2.0, 6.0]);
        let b = add_row_broadcast(&m(&[&[1.0, 1.0], &[2.0, 2.0]]), &[10.0, 20.0]).unwrap();
        assert_eq!(b, m(&[&[11.0, 21.0], &[12.0, 22.0]]));
    }

    #[test]
    fn transpose_swaps_shape() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let t = transpose(&a);
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);
        assert_eq!(transpose(&t), a);
    }

    #[test]
    fn arg_max_prefers_first_on_ties() {
        assert_eq!(arg_max(&[1.0, 3.0, 3.0, 2.0]).unwrap(), 1);
        assert_eq!(arg_max(&[5.0, 5.0]).unwrap(), 0);
        assert!(arg_max(&[]).is_err());
    }

    #[test]
    fn one_hot_sets_single_column() {
        let oh = one_hot(&[2, 0], 3).unwrap();
        assert_eq!(oh, m(&[&[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0]]));
        assert_eq!(
            one_hot(&[3], 3).unwrap_err(),
            Error::LabelOutOfRange {
                label: 3,
                num_classes: 3
            }
        );
    }
}
