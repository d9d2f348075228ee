//! Forward iteration of a mutation Markov chain until the allele
//! frequencies stop changing.

use anyhow::{bail, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::matrix::{all_close, ABSOLUTE_TOLERANCE, RELATIVE_TOLERANCE};
use crate::mutation::TransitionMatrix;
use crate::solvers::DiscreteMap;
use crate::traits::Steppable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Absolute tolerance of the element-wise convergence test.
    pub tolerance: f64,
    /// Relative tolerance of the element-wise convergence test.
    pub relative_tolerance: f64,
    pub max_iter: usize,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            tolerance: ABSOLUTE_TOLERANCE,
            relative_tolerance: RELATIVE_TOLERANCE,
            max_iter: 10_000,
        }
    }
}

/// Frequencies per generation, starting with the initial distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTrajectory {
    pub generations: Vec<Vec<f64>>,
    pub converged: bool,
    pub iterations: usize,
}

impl ChainTrajectory {
    pub fn initial(&self) -> Option<&[f64]> {
        self.generations.first().map(Vec::as_slice)
    }

    pub fn last(&self) -> Option<&[f64]> {
        self.generations.last().map(Vec::as_slice)
    }

    /// Frequency of `state` across all generations, `None` if any
    /// generation lacks that state.
    pub fn series(&self, state: usize) -> Option<Vec<f64>> {
        self.generations.iter().map(|g| g.get(state).copied()).collect()
    }
}

/// Applies `matrix` to `initial` until two consecutive generations are
/// close or `settings.max_iter` steps have been taken.
///
/// Running out of iterations is not an error: a warning is logged and the
/// partial trajectory comes back with `converged == false`.
pub fn iterate_chain(
    initial: &[f64],
    matrix: &TransitionMatrix,
    settings: ChainSettings,
) -> Result<ChainTrajectory> {
    let dim = matrix.dimension();
    if initial.len() != dim {
        bail!(
            "Initial frequency dimension mismatch. Expected {}, got {}.",
            dim,
            initial.len()
        );
    }
    if initial.iter().any(|v| !v.is_finite()) {
        bail!("Initial frequencies must be finite.");
    }
    if !(settings.tolerance >= 0.0 && settings.tolerance.is_finite()) {
        bail!("tolerance must be finite and non-negative.");
    }
    if !(settings.relative_tolerance >= 0.0 && settings.relative_tolerance.is_finite()) {
        bail!("relative_tolerance must be finite and non-negative.");
    }

    let mut stepper = DiscreteMap::new(dim);
    let mut state = initial.to_vec();
    let mut generations = vec![state.clone()];
    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < settings.max_iter {
        stepper.step(matrix, &mut iterations, &mut state);
        let previous = &generations[generations.len() - 1];
        let close = all_close(
            &state,
            previous,
            settings.relative_tolerance,
            settings.tolerance,
        );
        generations.push(state.clone());
        if close {
            converged = true;
            break;
        }
    }

    if converged {
        debug!("chain converged after {} iterations", iterations);
    } else {
        warn!("chain did not converge in {} iterations", settings.max_iter);
    }

    Ok(ChainTrajectory {
        generations,
        converged,
        iterations,
    })
}
