//! LU factorisation by Gaussian elimination without pivoting, plus a
//! pivoted fallback for callers that cannot guarantee non-zero pivots.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::ensure_square;
use crate::substitution::{substitute, Triangle};

/// Unit lower-triangular `lower` and upper-triangular `upper` with
/// `lower * upper == a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuFactors {
    pub lower: DMatrix<f64>,
    pub upper: DMatrix<f64>,
}

impl LuFactors {
    /// Solves `a · x = b` by forward substitution on `lower` followed by
    /// backward substitution on `upper`.
    pub fn solve(&self, b: &[f64]) -> MatrixResult<Vec<f64>> {
        let y = substitute(&self.lower, b, Triangle::Lower)?;
        substitute(&self.upper, &y, Triangle::Upper)
    }

    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.lower * &self.upper
    }
}

/// Factors `a` into `L · U`.
///
/// No rows are exchanged. When a pivot is exactly zero its column is left
/// uneliminated, so the factors no longer reproduce `a`; use
/// [`solve_pivoted`] if that can happen.
pub fn lu_decompose(a: &DMatrix<f64>) -> MatrixResult<LuFactors> {
    let n = ensure_square(a)?;
    let mut upper = a.clone();
    let mut lower = DMatrix::<f64>::identity(n, n);

    for col in 0..n {
        let pivot = upper[(col, col)];
        if pivot == 0.0 {
            debug!("zero pivot in column {}, skipping elimination", col);
            continue;
        }
        for row in col + 1..n {
            let factor = -(upper[(row, col)] / pivot);
            lower[(row, col)] = -factor;
            for idx in col + 1..n {
                let delta = factor * upper[(col, idx)];
                upper[(row, idx)] += delta;
            }
            upper[(row, col)] = 0.0;
        }
    }

    Ok(LuFactors { lower, upper })
}

/// Solves `a · x = b` through the unpivoted factors.
pub fn solve_by_lu(a: &DMatrix<f64>, b: &[f64]) -> MatrixResult<Vec<f64>> {
    let n = ensure_square(a)?;
    if b.len() != n {
        return Err(MatrixError::LengthMismatch {
            expected: n,
            actual: b.len(),
        });
    }
    lu_decompose(a)?.solve(b)
}

/// Solves `a · x = b` with partial pivoting.
pub fn solve_pivoted(a: &DMatrix<f64>, b: &[f64]) -> MatrixResult<Vec<f64>> {
    let n = ensure_square(a)?;
    if b.len() != n {
        return Err(MatrixError::LengthMismatch {
            expected: n,
            actual: b.len(),
        });
    }
    let rhs = DVector::from_column_slice(b);
    a.clone()
        .lu()
        .solve(&rhs)
        .map(|v| v.iter().cloned().collect())
        .ok_or(MatrixError::SingularMatrix)
}
