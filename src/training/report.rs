/// The loss trajectory of a finished training run, one entry per epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub losses: Vec<f32>,
    pub val_losses: Vec<Option<f32>>,
}

impl TrainingReport {
    pub fn with_capacity(epochs: usize) -> Self {
        Self {
            losses: Vec::with_capacity(epochs),
            val_losses: Vec::with_capacity(epochs),
        }
    }

    pub fn push(&mut self, loss: f32, val_loss: Option<f32>) {
        self.losses.push(loss);
        self.val_losses.push(val_loss);
    }

    #[inline]
    pub fn epochs(&self) -> usize {
        self.losses.len()
    }

    /// The training loss of the last epoch.
    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    pub fn final_val_loss(&self) -> Option<f32> {
        self.val_losses.last().copied().flatten()
    }
}
