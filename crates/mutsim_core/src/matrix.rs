//! Dense matrix helpers shared by the chain and LU code.
//!
//! Matrices are nalgebra `DMatrix<f64>` values. Products are written as
//! explicit multiply-accumulate loops so the dimension check and the
//! accumulation order stay visible.

use nalgebra::DMatrix;

use crate::error::{MatrixError, MatrixResult};

/// Default relative tolerance for [`is_close`].
pub const RELATIVE_TOLERANCE: f64 = 1e-5;

/// Absolute tolerance used when classifying states and testing convergence.
pub const ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// Multiplies `a` by `b`.
///
/// Returns [`MatrixError::DimensionMismatch`] when the inner dimensions
/// disagree.
pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> MatrixResult<DMatrix<f64>> {
    if a.ncols() != b.nrows() {
        return Err(MatrixError::DimensionMismatch {
            left_rows: a.nrows(),
            left_cols: a.ncols(),
            right_rows: b.nrows(),
            right_cols: b.ncols(),
        });
    }

    let mut result = DMatrix::zeros(a.nrows(), b.ncols());
    for i in 0..a.nrows() {
        for j in 0..b.ncols() {
            let mut acc = 0.0;
            for k in 0..a.ncols() {
                acc = a[(i, k)].mul_add(b[(k, j)], acc);
            }
            result[(i, j)] = acc;
        }
    }
    Ok(result)
}

/// Computes the row vector product `x · m`.
pub(crate) fn row_vector_times(x: &[f64], m: &DMatrix<f64>, out: &mut [f64]) {
    for (j, slot) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (i, &xi) in x.iter().enumerate() {
            acc = xi.mul_add(m[(i, j)], acc);
        }
        *slot = acc;
    }
}

/// Returns a square matrix error unless `m` is square and non-empty.
pub(crate) fn ensure_square(m: &DMatrix<f64>) -> MatrixResult<usize> {
    if m.nrows() == 0 || m.nrows() != m.ncols() {
        return Err(MatrixError::NotSquare {
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(m.nrows())
}

pub fn row_sums(m: &DMatrix<f64>) -> Vec<f64> {
    m.row_iter().map(|row| row.sum()).collect()
}

pub fn column_sums(m: &DMatrix<f64>) -> Vec<f64> {
    m.column_iter().map(|col| col.sum()).collect()
}

/// Element-wise closeness: `|a - b| <= atol + rtol * |b|`.
pub fn is_close(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

/// True when both slices have the same length and every pair is close.
pub fn all_close(a: &[f64], b: &[f64], rtol: f64, atol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| is_close(x, y, rtol, atol))
}
