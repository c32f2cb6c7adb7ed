use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Adam with bias-corrected first and second moment estimates.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    decay: (f32, f32),
    decay_pow: (f32, f32),
    epsilon: f32,
    first_moment: Array1<f32>,
    second_moment: Array1<f32>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2` - Decay rates of the first and second moment estimates.
    /// * `epsilon` - Keeps the step finite where the second moment is zero.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            decay: (beta1, beta2),
            decay_pow: (1., 1.),
            epsilon,
            first_moment: Array1::zeros(len),
            second_moment: Array1::zeros(len),
        }
    }

    /// The learning rate scaled by both bias corrections for the current step.
    fn corrected_step(&mut self) -> f32 {
        let (b1, b2) = self.decay;
        self.decay_pow.0 *= b1;
        self.decay_pow.1 *= b2;

        let (b1_t, b2_t) = self.decay_pow;
        self.learning_rate * (1. - b2_t).sqrt() / (1. - b1_t)
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_sizes("gradient", grad.len(), params.len())?;
        check_sizes("adam state", self.first_moment.len(), params.len())?;

        let step = self.corrected_step();
        let (b1, b2) = self.decay;
        let eps = self.epsilon;

        Zip::from(ArrayViewMut1::from(params))
            .and(ArrayView1::from(grad))
            .and(&mut self.first_moment)
            .and(&mut self.second_moment)
            .for_each(|p, &g, m, v| {
                *m = b1 * *m + (1. - b1) * g;
                *v = b2 * *v + (1. - b2) * g * g;
                *p -= step * *m / (v.sqrt() + eps);
            });

        Ok(())
    }
}
