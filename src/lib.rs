pub mod data;
pub mod error;
pub mod initialization;
pub mod model;
pub mod optimization;
pub mod recommender;
pub mod storage;
pub mod training;

pub use data::{Dataset, DatasetLoader, Rating, RatingMatrix};
pub use error::{RecErr, Result};
pub use model::{MatrixFactorization, ModelShape};
pub use recommender::{Recommender, TrainedModel, build_and_train};
pub use training::{EpochStats, Progress, Trainer, TrainingConfig, TrainingReport};
