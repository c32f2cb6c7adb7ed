use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ParameterLayout;
use crate::initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen, Result};

/// How the latent factor tables are initialized, biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorInit {
    Uniform { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
}

impl Default for FactorInit {
    fn default() -> Self {
        Self::Uniform {
            low: -0.05,
            high: 0.05,
        }
    }
}

impl FactorInit {
    /// Builds the generator for an entire parameter buffer of `layout`, in layout order.
    ///
    /// # Arguments
    /// * `layout` - The already size checked layout of the model.
    /// * `rng` - The random number generator shared by both factor tables.
    ///
    /// # Returns
    /// The chained generator or an error if the distribution is invalid.
    pub fn param_gen<R>(
        &self,
        layout: &ParameterLayout,
        rng: Rc<RefCell<R>>,
    ) -> Result<ChainedParamGen>
    where
        R: Rng + 'static,
    {
        let factors = |limit| -> Result<Box<dyn ParamGen>> {
            let rng = Rc::clone(&rng);

            let param_gen: Box<dyn ParamGen> = match *self {
                FactorInit::Uniform { low, high } => {
                    Box::new(RandParamGen::uniform(rng, limit, low, high)?)
                }
                FactorInit::Normal { mean, std_dev } => {
                    Box::new(RandParamGen::normal(rng, limit, mean, std_dev)?)
                }
            };

            Ok(param_gen)
        };

        Ok(ChainedParamGen::new(vec![
            factors(layout.user_factors.len())?,
            factors(layout.item_factors.len())?,
            Box::new(ConstParamGen::zeros(layout.user_bias.len())),
            Box::new(ConstParamGen::zeros(layout.item_bias.len())),
        ]))
    }
}
