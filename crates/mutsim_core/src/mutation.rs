//! Construction of row-stochastic transition matrices from raw mutation
//! rates.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::{ensure_square, row_vector_times, row_sums};
use crate::traits::DiscreteSystem;

/// A square transition matrix whose entry (i, j) is the probability that
/// state `i` becomes state `j` in one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DMatrix<f64>", into = "DMatrix<f64>")]
pub struct TransitionMatrix {
    matrix: DMatrix<f64>,
}

impl TransitionMatrix {
    /// Wraps an already row-stochastic matrix. Only the shape is checked.
    pub fn from_matrix(matrix: DMatrix<f64>) -> MatrixResult<Self> {
        ensure_square(&matrix)?;
        Ok(Self { matrix })
    }

    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.matrix
    }

    pub fn row_sums(&self) -> Vec<f64> {
        row_sums(&self.matrix)
    }

    /// Advances a frequency distribution by one generation: `freq · M`.
    pub fn propagate(&self, freq: &[f64]) -> MatrixResult<Vec<f64>> {
        if freq.len() != self.dimension() {
            return Err(MatrixError::LengthMismatch {
                expected: self.dimension(),
                actual: freq.len(),
            });
        }
        let mut out = vec![0.0; self.dimension()];
        row_vector_times(freq, &self.matrix, &mut out);
        Ok(out)
    }
}

impl TryFrom<DMatrix<f64>> for TransitionMatrix {
    type Error = MatrixError;

    fn try_from(matrix: DMatrix<f64>) -> MatrixResult<Self> {
        Self::from_matrix(matrix)
    }
}

impl From<TransitionMatrix> for DMatrix<f64> {
    fn from(transition: TransitionMatrix) -> Self {
        transition.matrix
    }
}

impl DiscreteSystem<f64> for TransitionMatrix {
    fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    fn apply(&self, x: &[f64], out: &mut [f64]) {
        row_vector_times(x, &self.matrix, out);
    }
}

/// Completes the diagonal of `raw_rates` so every row sums to one.
///
/// `raw_rates[(i, j)]` is the probability of mutating from `i` to `j`; the
/// diagonal of the input is ignored. Rows whose off-diagonal sum exceeds
/// one are not rejected and produce a negative diagonal entry.
pub fn build_transition_matrix(raw_rates: &DMatrix<f64>) -> MatrixResult<TransitionMatrix> {
    let n = ensure_square(raw_rates)?;
    let mut matrix = raw_rates.clone();
    for i in 0..n {
        let outflow: f64 = (0..n).filter(|&j| j != i).map(|j| raw_rates[(i, j)]).sum();
        matrix[(i, i)] = 1.0 - outflow;
    }
    Ok(TransitionMatrix { matrix })
}
