//! The `mutsim_core` crate provides the numerical engine for the mutsim demos.
//! Everything is headless and single-threaded; results are plain owned values.
//!
//! Key components:
//! - **Mutation**: raw mutation rates to a row-stochastic `TransitionMatrix`.
//! - **Chain**: forward iteration of allele frequencies until convergence.
//! - **Equilibrium**: stationary distribution with isolated-state handling, via SVD least squares.
//! - **LU / Substitution**: unpivoted LU factorisation and triangular solves.
//! - **Matrix**: checked dense multiplication and closeness helpers.

pub mod chain;
pub mod equilibrium;
pub mod error;
pub mod lu;
pub mod matrix;
pub mod mutation;
pub mod simulation;
pub mod solvers;
pub mod substitution;
pub mod traits;

pub use chain::{iterate_chain, ChainSettings, ChainTrajectory};
pub use equilibrium::{classify_states, compute_equilibrium, StateClass};
pub use error::{MatrixError, MatrixResult};
pub use lu::{lu_decompose, solve_by_lu, solve_pivoted, LuFactors};
pub use matrix::multiply;
pub use mutation::{build_transition_matrix, TransitionMatrix};
pub use simulation::{
    equilibrium_annotation, run_simulation, run_simulation_with_sink, SimulationResult,
    TrajectorySink,
};
pub use substitution::{substitute, Triangle};
