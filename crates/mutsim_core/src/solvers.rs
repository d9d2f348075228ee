use crate::traits::{DiscreteSystem, Scalar, Steppable};

/// Discrete Map Stepper
/// Just evaluates x_{n+1} = f(x_n) and bumps the generation counter.
pub struct DiscreteMap<T: Scalar> {
    tmp: Vec<T>,
}

impl<T: Scalar> DiscreteMap<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for DiscreteMap<T> {
    fn step(&mut self, system: &impl DiscreteSystem<T>, generation: &mut usize, state: &mut [T]) {
        system.apply(state, &mut self.tmp);
        state.copy_from_slice(&self.tmp);
        *generation += 1;
    }
}
