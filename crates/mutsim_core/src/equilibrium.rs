//! Stationary distribution of a mutation chain.
//!
//! States that neither lose nor receive probability mass keep their initial
//! frequency. The remaining states satisfy `p = p · M` restricted to the
//! active block, with the last balance equation replaced by the
//! conservation constraint `Σ p = 1 - Σ isolated`. The system is solved by
//! SVD least squares so the redundant balance equation (or any further
//! rank deficiency) yields the minimum-norm solution rather than a failure.

use anyhow::{anyhow, bail, Result};
use log::debug;
use nalgebra::linalg::SVD;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::MatrixResult;
use crate::matrix::{column_sums, is_close, ABSOLUTE_TOLERANCE, RELATIVE_TOLERANCE};
use crate::mutation::TransitionMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateClass {
    /// Self-loop probability one and no inbound mass.
    Isolated,
    /// Coupled to at least one other state.
    Active,
}

/// Classifies every state of `matrix`.
pub fn classify_states(matrix: &TransitionMatrix) -> Vec<StateClass> {
    let m = matrix.as_matrix();
    let inflow = column_sums(m);
    (0..matrix.dimension())
        .map(|i| {
            let self_loop = is_close(m[(i, i)], 1.0, RELATIVE_TOLERANCE, ABSOLUTE_TOLERANCE);
            let closed = is_close(inflow[i], 1.0, RELATIVE_TOLERANCE, ABSOLUTE_TOLERANCE);
            if self_loop && closed {
                StateClass::Isolated
            } else {
                StateClass::Active
            }
        })
        .collect()
}

/// Solves for the stationary distribution of `matrix`, holding isolated
/// states at their value in `initial`.
pub fn compute_equilibrium(matrix: &TransitionMatrix, initial: &[f64]) -> Result<Vec<f64>> {
    let dim = matrix.dimension();
    if initial.len() != dim {
        bail!(
            "Initial frequency dimension mismatch. Expected {}, got {}.",
            dim,
            initial.len()
        );
    }

    let classes = classify_states(matrix);
    let mut equilibrium = vec![0.0; dim];
    let mut isolated_mass = 0.0;
    let mut active = Vec::with_capacity(dim);
    for (i, class) in classes.iter().enumerate() {
        match class {
            StateClass::Isolated => {
                equilibrium[i] = initial[i];
                isolated_mass += initial[i];
            }
            StateClass::Active => active.push(i),
        }
    }

    let k = active.len();
    if k == 0 {
        debug!("all {} states isolated, skipping solve", dim);
        return Ok(equilibrium);
    }
    debug!("solving equilibrium for {} of {} states", k, dim);

    let m = matrix.as_matrix();
    let mut system = DMatrix::from_fn(k, k, |r, c| m[(active[c], active[r])]);
    for i in 0..k {
        system[(i, i)] -= 1.0;
    }
    system.row_mut(k - 1).fill(1.0);

    let mut rhs = DVector::zeros(k);
    rhs[k - 1] = 1.0 - isolated_mass;

    let solution = least_squares(system, &rhs)?;
    for (slot, &idx) in active.iter().enumerate() {
        equilibrium[idx] = solution[slot];
    }
    Ok(equilibrium)
}

/// Largest entry of `|p · M - p|`.
pub fn stationarity_residual(matrix: &TransitionMatrix, p: &[f64]) -> MatrixResult<f64> {
    Ok(matrix
        .propagate(p)?
        .iter()
        .zip(p)
        .map(|(next, cur)| (next - cur).abs())
        .fold(0.0, f64::max))
}

/// Minimum-norm least-squares solution, treating singular values below
/// `ε · max(rows, cols) · σ_max` as zero.
fn least_squares(a: DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    let scale = a.nrows().max(a.ncols()) as f64;
    let svd = SVD::try_new(a, true, true, f64::EPSILON, 0)
        .ok_or_else(|| anyhow!("SVD failed to converge on the equilibrium system."))?;
    let cutoff = f64::EPSILON * scale * svd.singular_values.max();
    svd.solve(b, cutoff)
        .map_err(|e| anyhow!("Least-squares solve failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::build_transition_matrix;

    fn transition(n: usize, data: &[f64]) -> TransitionMatrix {
        TransitionMatrix::from_matrix(DMatrix::from_row_slice(n, n, data)).unwrap()
    }

    fn assert_vec_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn allele_example_matches_long_run_frequencies() {
        let raw = DMatrix::from_row_slice(
            4,
            4,
            &[
                0.0, 0.01, 0.005, 0.03, //
                0.02, 0.0, 0.01, 0.01, //
                0.001, 0.03, 0.0, 0.2, //
                0.0, 0.1, 0.2, 0.0,
            ],
        );
        let m = build_transition_matrix(&raw).unwrap();
        let eq = compute_equilibrium(&m, &[0.4, 0.3, 0.2, 0.1]).unwrap();
        assert_vec_close(&eq, &[0.2247319, 0.4985170, 0.1425964, 0.1341547], 1e-6);
        assert!((eq.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(stationarity_residual(&m, &eq).unwrap() < 1e-12);
        assert!(stationarity_residual(&m, &eq[..3]).is_err());
    }

    #[test]
    fn isolated_state_keeps_its_initial_frequency() {
        let m = transition(3, &[0.9, 0.1, 0.0, 0.3, 0.7, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            classify_states(&m),
            vec![StateClass::Active, StateClass::Active, StateClass::Isolated]
        );
        let eq = compute_equilibrium(&m, &[0.5, 0.3, 0.2]).unwrap();
        assert_eq!(eq[2], 0.2);
        assert_vec_close(&eq, &[0.6, 0.2, 0.2], 1e-12);
    }

    #[test]
    fn absorbing_state_with_inflow_is_active() {
        let m = transition(2, &[1.0, 0.0, 0.1, 0.9]);
        assert_eq!(
            classify_states(&m),
            vec![StateClass::Active, StateClass::Active]
        );
        let eq = compute_equilibrium(&m, &[0.0, 1.0]).unwrap();
        assert_vec_close(&eq, &[1.0, 0.0], 1e-12);
    }

    #[test]
    fn all_isolated_returns_initial_vector() {
        let m = TransitionMatrix::from_matrix(DMatrix::identity(3, 3)).unwrap();
        let eq = compute_equilibrium(&m, &[0.1, 0.2, 0.7]).unwrap();
        assert_eq!(eq, vec![0.1, 0.2, 0.7]);
    }

    #[test]
    fn rank_deficient_system_yields_minimum_norm_solution() {
        let m = transition(3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.5, 0.0]);
        let eq = compute_equilibrium(&m, &[0.2, 0.3, 0.5]).unwrap();
        assert_vec_close(&eq, &[0.5, 0.5, 0.0], 1e-10);
    }

    #[test]
    fn rejects_length_mismatch() {
        let m = transition(2, &[0.5, 0.5, 0.5, 0.5]);
        let err = compute_equilibrium(&m, &[1.0]).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }
}
