//! End-to-end allele-frequency simulation: build the transition matrix,
//! iterate the chain, solve the equilibrium and hand both to a sink.

use anyhow::{Context, Result};
use log::info;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::chain::{iterate_chain, ChainSettings, ChainTrajectory};
use crate::equilibrium::{classify_states, compute_equilibrium, StateClass};
use crate::mutation::{build_transition_matrix, TransitionMatrix};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub transition: TransitionMatrix,
    pub trajectory: ChainTrajectory,
    pub equilibrium: Vec<f64>,
    pub classes: Vec<StateClass>,
}

/// Consumer of a finished simulation, typically a chart.
pub trait TrajectorySink {
    fn render(&mut self, trajectory: &ChainTrajectory, equilibrium: &[f64]) -> Result<()>;
}

pub fn run_simulation(
    initial: &[f64],
    raw_rates: &DMatrix<f64>,
    settings: ChainSettings,
) -> Result<SimulationResult> {
    let transition =
        build_transition_matrix(raw_rates).context("Failed to build transition matrix.")?;
    let trajectory = iterate_chain(initial, &transition, settings)?;
    let equilibrium = compute_equilibrium(&transition, initial)
        .context("Failed to compute equilibrium distribution.")?;
    let classes = classify_states(&transition);

    info!(
        "simulated {} generations (converged: {}), equilibrium {}",
        trajectory.iterations,
        trajectory.converged,
        equilibrium_annotation(&equilibrium)
    );

    Ok(SimulationResult {
        transition,
        trajectory,
        equilibrium,
        classes,
    })
}

pub fn run_simulation_with_sink(
    initial: &[f64],
    raw_rates: &DMatrix<f64>,
    settings: ChainSettings,
    sink: &mut impl TrajectorySink,
) -> Result<SimulationResult> {
    let result = run_simulation(initial, raw_rates, settings)?;
    sink.render(&result.trajectory, &result.equilibrium)
        .context("Trajectory sink failed.")?;
    Ok(result)
}

/// Formats equilibrium values as `A1=0.2247  A2=0.4985 ...`.
pub fn equilibrium_annotation(equilibrium: &[f64]) -> String {
    equilibrium
        .iter()
        .enumerate()
        .map(|(i, v)| format!("A{}={:.4}", i + 1, v))
        .collect::<Vec<_>>()
        .join("  ")
}
