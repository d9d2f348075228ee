//! Forward and backward substitution on triangular systems.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::ensure_square;

/// Which triangle of the matrix holds the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Triangle {
    /// Solved smallest index first.
    Lower,
    /// Solved largest index first.
    Upper,
}

/// Solves `matrix · x = rhs` for a triangular `matrix`.
///
/// Only the selected triangle is read; entries on the other side of the
/// diagonal are ignored. A zero on the diagonal yields
/// [`MatrixError::ZeroDiagonal`].
pub fn substitute(matrix: &DMatrix<f64>, rhs: &[f64], triangle: Triangle) -> MatrixResult<Vec<f64>> {
    let n = ensure_square(matrix)?;
    if rhs.len() != n {
        return Err(MatrixError::LengthMismatch {
            expected: n,
            actual: rhs.len(),
        });
    }

    let mut x = vec![0.0; n];
    match triangle {
        Triangle::Lower => {
            for i in 0..n {
                let known: f64 = (0..i).map(|j| matrix[(i, j)] * x[j]).sum();
                x[i] = divide_by_diagonal(matrix, i, rhs[i] - known)?;
            }
        }
        Triangle::Upper => {
            for i in (0..n).rev() {
                let known: f64 = (i + 1..n).map(|j| matrix[(i, j)] * x[j]).sum();
                x[i] = divide_by_diagonal(matrix, i, rhs[i] - known)?;
            }
        }
    }
    Ok(x)
}

fn divide_by_diagonal(matrix: &DMatrix<f64>, index: usize, residual: f64) -> MatrixResult<f64> {
    let diag = matrix[(index, index)];
    if diag == 0.0 {
        return Err(MatrixError::ZeroDiagonal { index });
    }
    Ok(residual / diag)
}
