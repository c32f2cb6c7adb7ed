use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Heavy-ball momentum: the step follows a decaying sum of past gradients.
#[derive(Debug)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
    velocity: Array1<f32>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - The fraction of the previous velocity kept on each step.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance.
    pub fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: Array1::zeros(len),
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_sizes("gradient", grad.len(), params.len())?;
        check_sizes("momentum state", self.velocity.len(), params.len())?;

        self.velocity *= self.momentum;
        self.velocity += &ArrayView1::from(grad);
        ArrayViewMut1::from(params).scaled_add(-self.learning_rate, &self.velocity);

        Ok(())
    }
}
