use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

pub type Result<T> = std::result::Result<T, RandErr>;

/// A factor distribution that can't be built from its parameters.
#[derive(Debug)]
pub struct RandErr {
    distribution: &'static str,
    reason: String,
}

impl RandErr {
    /// The name of the distribution that was rejected.
    pub fn distribution(&self) -> &'static str {
        self.distribution
    }
}

impl From<NormalError> for RandErr {
    fn from(value: NormalError) -> Self {
        Self {
            distribution: "normal",
            reason: value.to_string(),
        }
    }
}

impl From<UniformError> for RandErr {
    fn from(value: UniformError) -> Self {
        Self {
            distribution: "uniform",
            reason: value.to_string(),
        }
    }
}

impl Display for RandErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} factor init: {}", self.distribution, self.reason)
    }
}

impl Error for RandErr {}
