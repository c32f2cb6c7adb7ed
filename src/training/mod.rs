mod config;
mod guard;
mod progress;
mod report;
mod trainer;

pub use config::{OptimizerConfig, TrainingConfig};
pub use guard::TrainingGuard;
pub use progress::{EpochStats, LogProgress, Progress};
pub use report::TrainingReport;
pub use trainer::Trainer;
