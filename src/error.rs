use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use crate::initialization::RandErr;

/// The result type used in the entire recommender crate.
pub type Result<T> = std::result::Result<T, RecErr>;

/// The recommender's error type.
#[derive(Debug)]
pub enum RecErr {
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    TrainingAlreadyInProgress,
    TrainingFailure {
        epoch: usize,
        batch: usize,
        cause: Box<RecErr>,
    },
    NonFiniteLoss {
        loss: f32,
    },
    NonFiniteParams {
        index: usize,
    },
    NonFiniteScore {
        user_id: usize,
        item_id: usize,
    },
    IdTooLarge {
        what: &'static str,
        id: usize,
        max: usize,
    },
    ModelTooLarge {
        num_users: usize,
        num_items: usize,
        latent_dim: usize,
    },
    ModelNotReady,
    EmptyDataset,
    EmptyTrainingSet {
        total: usize,
        validation_split: f32,
    },
    InvalidConfig(String),
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    Config(String),
}

impl RecErr {
    /// Wraps `self` as the cause of a failed training run.
    ///
    /// # Arguments
    /// * `epoch` - The epoch the failure happened in.
    /// * `batch` - The batch of that epoch being processed.
    pub fn during(self, epoch: usize, batch: usize) -> Self {
        Self::TrainingFailure {
            epoch,
            batch,
            cause: Box::new(self),
        }
    }
}

impl Display for RecErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecErr::IndexOutOfRange { what, index, len } => {
                write!(f, "{what} index {index} is out of range, expected < {len}")
            }
            RecErr::TrainingAlreadyInProgress => {
                f.write_str("a training run is already in progress")
            }
            RecErr::TrainingFailure {
                epoch,
                batch,
                cause,
            } => write!(f, "training failed at epoch {epoch}, batch {batch}: {cause}"),
            RecErr::NonFiniteLoss { loss } => write!(f, "the loss became non-finite ({loss})"),
            RecErr::NonFiniteParams { index } => {
                write!(f, "parameter {index} became non-finite")
            }
            RecErr::NonFiniteScore { user_id, item_id } => {
                write!(f, "the score of item {item_id} for user {user_id} is not a number")
            }
            RecErr::IdTooLarge { what, id, max } => {
                write!(f, "{what} id {id} is too large, expected <= {max}")
            }
            RecErr::ModelTooLarge {
                num_users,
                num_items,
                latent_dim,
            } => write!(
                f,
                "a model of {num_users} users, {num_items} items and latent dimension {latent_dim} is too large"
            ),
            RecErr::ModelNotReady => f.write_str("the model is not trained yet"),
            RecErr::EmptyDataset => f.write_str("the dataset has no ratings"),
            RecErr::EmptyTrainingSet {
                total,
                validation_split,
            } => write!(
                f,
                "no ratings left for training, {total} ratings with a validation split of {validation_split}"
            ),
            RecErr::InvalidConfig(msg) => write!(f, "invalid training config: {msg}"),
            RecErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch in {what}, got {got} and expected {expected}"),
            RecErr::Config(msg) => write!(f, "failed to load config: {msg}"),
        }
    }
}

impl Error for RecErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecErr::TrainingFailure { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RecErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<RandErr> for RecErr {
    fn from(value: RandErr) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}

impl From<io::Error> for RecErr {
    fn from(value: io::Error) -> Self {
        Self::Config(value.to_string())
    }
}
