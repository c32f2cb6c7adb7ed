use std::{fs, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    RecErr, Result,
    model::FactorInit,
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer},
};

/// The optimization algorithm used to apply the batch gradients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
    GradientDescent,
    GradientDescentWithMomentum { momentum: f32 },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

/// Everything needed to build and train a model, every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub latent_dim: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// The trailing fraction of the ratings held out for validation.
    pub validation_split: f32,
    pub optimizer: OptimizerConfig,
    pub init: FactorInit,
    /// Whether the training portion is shuffled before every epoch.
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            latent_dim: 8,
            epochs: 8,
            batch_size: 32,
            learning_rate: 0.01,
            validation_split: 0.1,
            optimizer: OptimizerConfig::default(),
            init: FactorInit::default(),
            shuffle: true,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every field is inside its domain.
    ///
    /// # Returns
    /// An `InvalidConfig` error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RecErr::InvalidConfig(msg));

        if self.latent_dim == 0 {
            return invalid("latent_dim must be at least 1".into());
        }
        if self.epochs == 0 {
            return invalid("epochs must be at least 1".into());
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }
        if !(0. ..1.).contains(&self.validation_split) {
            return invalid(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            ));
        }

        Ok(())
    }

    /// A seeded rng when `seed` is set, one seeded from the OS otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Builds the configured optimizer for a buffer of `nparams` parameters.
    pub fn build_optimizer(&self, nparams: usize) -> Box<dyn Optimizer + Send> {
        let lr = self.learning_rate;

        match self.optimizer {
            OptimizerConfig::Adam {
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(nparams, lr, beta1, beta2, epsilon)),
            OptimizerConfig::GradientDescent => Box::new(GradientDescent::new(lr)),
            OptimizerConfig::GradientDescentWithMomentum { momentum } => {
                Box::new(GradientDescentWithMomentum::new(nparams, lr, momentum))
            }
        }
    }
}
