//! Row-major `f64` products behind `linalg`.
//!
//! Operands are contiguous row-major [`Matrix`] buffers. An operand can be read
//! as its own transpose, which lets gradient descent form `X * W^T` and
//! `D^T * X` without materializing a transposed copy. With the
//! `matrixmultiply` feature the product is handed to `matrixmultiply::dgemm`.

use crate::Matrix;

/// How a stored matrix is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    AsIs,
    Transposed,
}

/// A borrowed matrix plus the way it is read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operand<'a> {
    data: &'a [f64],
    stored_cols: usize,
    rows: usize,
    cols: usize,
    op: Op,
}

impl<'a> Operand<'a> {
    pub(crate) fn new(matrix: &'a Matrix, op: Op) -> Self {
        let (rows, cols) = match op {
            Op::AsIs => matrix.shape(),
            Op::Transposed => (matrix.cols(), matrix.rows()),
        };
        Self {
            data: matrix.as_slice(),
            stored_cols: matrix.cols(),
            rows,
            cols,
            op,
        }
    }

    /// Shape as read, not as stored.
    #[inline]
    pub(crate) fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `(row stride, column stride)` of the logical view.
    #[inline]
    fn strides(&self) -> (usize, usize) {
        match self.op {
            Op::AsIs => (self.stored_cols, 1),
            Op::Transposed => (1, self.stored_cols),
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        let (rs, cs) = self.strides();
        self.data[row * rs + col * cs]
    }
}

/// `lhs * rhs` into a fresh `(lhs.rows, rhs.cols)` matrix.
///
/// Shapes must already agree (`lhs.cols == rhs.rows`); `linalg` checks them.
pub(crate) fn product(lhs: Operand<'_>, rhs: Operand<'_>) -> Matrix {
    let (m, k) = lhs.shape();
    let n = rhs.cols;
    debug_assert_eq!(k, rhs.rows);

    let mut out = Matrix::zeros(m, n);
    if m == 0 || n == 0 || k == 0 {
        return out;
    }
    accumulate(lhs, rhs, out.as_mut_slice(), n);
    out
}

#[cfg(feature = "matrixmultiply")]
fn accumulate(lhs: Operand<'_>, rhs: Operand<'_>, out: &mut [f64], n: usize) {
    let (rsa, csa) = lhs.strides();
    let (rsb, csb) = rhs.strides();
    // SAFETY: both operands index only `data` through their own strides and
    // extents, and `out` holds exactly `lhs.rows * n` elements.
    unsafe {
        matrixmultiply::dgemm(
            lhs.rows,
            lhs.cols,
            n,
            1.0,
            lhs.data.as_ptr(),
            rsa as isize,
            csa as isize,
            rhs.data.as_ptr(),
            rsb as isize,
            csb as isize,
            0.0,
            out.as_mut_ptr(),
            n as isize,
            1,
        );
    }
}

#[cfg(not(feature = "matrixmultiply"))]
fn accumulate(lhs: Operand<'_>, rhs: Operand<'_>, out: &mut [f64], n: usize) {
    for (i, out_row) in out.chunks_exact_mut(n).enumerate() {
        match rhs.op {
            // Row i of the output is a combination of rhs rows.
            Op::AsIs => {
                for p in 0..lhs.cols {
                    let a = lhs.at(i, p);
                    let start = p * rhs.stored_cols;
                    let b_row = &rhs.data[start..start + n];
                    for (o, &b) in out_row.iter_mut().zip(b_row) {
                        *o += a * b;
                    }
                }
            }
            // rhs^T: each output entry is a dot product of two stored rows.
            Op::Transposed => {
                for (j, o) in out_row.iter_mut().enumerate() {
                    let start = j * rhs.stored_cols;
                    let b_row = &rhs.data[start..start + lhs.cols];
                    *o = b_row
                        .iter()
                        .enumerate()
                        .map(|(p, &b)| lhs.at(i, p) * b)
                        .sum();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn transposed_operands_read_without_copying() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[5.0, 6.0], &[7.0, 8.0]]);

        let ab = product(Operand::new(&a, Op::AsIs), Operand::new(&b, Op::AsIs));
        assert_eq!(ab, m(&[&[19.0, 22.0], &[43.0, 50.0]]));

        // A * B^T
        let abt = product(Operand::new(&a, Op::AsIs), Operand::new(&b, Op::Transposed));
        assert_eq!(abt, m(&[&[17.0, 23.0], &[39.0, 53.0]]));

        // A^T * B
        let atb = product(Operand::new(&a, Op::Transposed), Operand::new(&b, Op::AsIs));
        assert_eq!(atb, m(&[&[26.0, 30.0], &[38.0, 44.0]]));
    }

    #[test]
    fn non_square_transposed_lhs() {
        // D is (3, 2); D^T * X with X (3, 1).
        let d = m(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
        let x = m(&[&[2.0], &[3.0], &[4.0]]);
        let out = product(Operand::new(&d, Op::Transposed), Operand::new(&x, Op::AsIs));
        assert_eq!(out, m(&[&[6.0], &[7.0]]));
    }
}
