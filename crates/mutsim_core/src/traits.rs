use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in the chain machinery.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A discrete-time map acting on a state vector.
pub trait DiscreteSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the map.
    /// x: current state
    /// out: buffer to write x_{n+1}
    fn apply(&self, x: &[T], out: &mut [T]);
}

/// A trait for steppers that advance a system by one generation.
pub trait Steppable<T: Scalar> {
    /// Performs one step.
    /// generation: current generation counter (incremented after step)
    /// state: current state (updated after step)
    fn step(&mut self, system: &impl DiscreteSystem<T>, generation: &mut usize, state: &mut [T]);
}
