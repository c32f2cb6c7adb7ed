use std::{
    cell::RefCell,
    collections::HashSet,
    rc::Rc,
    sync::atomic::{AtomicBool, Ordering},
};

use log::info;
use parking_lot::RwLock;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    RecErr, Result,
    data::Dataset,
    model::{MatrixFactorization, ModelShape},
    training::{Progress, Trainer, TrainingConfig, TrainingGuard, TrainingReport},
};

/// A trained model together with the loss trajectory of its run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: MatrixFactorization,
    pub report: TrainingReport,
}

impl TrainedModel {
    /// Predicts the rating of `item_id` by `user_id`, in `[0, 5]`.
    pub fn predict(&self, user_id: usize, item_id: usize) -> Result<f32> {
        self.model.predict(user_id, item_id)
    }
}

/// Builds a model sized for `dataset` and trains it on all its ratings.
///
/// # Arguments
/// * `dataset` - The ratings to learn from, in their dataset order.
/// * `config` - The model and training hyperparameters.
/// * `progress` - Notified after every completed epoch.
///
/// # Returns
/// The trained model or the error that aborted the run.
pub fn build_and_train<P>(
    dataset: &Dataset,
    config: &TrainingConfig,
    progress: &mut P,
) -> Result<TrainedModel>
where
    P: Progress + ?Sized,
{
    config.validate()?;

    let rng = Rc::new(RefCell::new(config.rng()));
    let shape = ModelShape::new(dataset.num_users(), dataset.num_items(), config.latent_dim);
    let model = MatrixFactorization::build(shape, &config.init, Rc::clone(&rng))?;

    let shuffle_rng = StdRng::from_rng(&mut *rng.borrow_mut());
    let mut trainer = Trainer::from_config(config, model.num_params(), shuffle_rng);
    let report = trainer.train(&model, dataset.ratings(), progress)?;

    Ok(TrainedModel { model, report })
}

/// Owns a dataset and the model most recently trained on it.
///
/// At most one training run is in flight at any time, predictions are served by the
/// last successfully trained model while a new one trains.
#[derive(Debug)]
pub struct Recommender {
    dataset: Dataset,
    config: TrainingConfig,
    training: AtomicBool,
    model: RwLock<Option<MatrixFactorization>>,
}

impl Recommender {
    /// Creates a new `Recommender` with no trained model.
    ///
    /// # Returns
    /// A new `Recommender` or an `InvalidConfig` error.
    pub fn new(dataset: Dataset, config: TrainingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            dataset,
            config,
            training: AtomicBool::new(false),
            model: RwLock::new(None),
        })
    }

    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[inline]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn is_training(&self) -> bool {
        self.training.load(Ordering::Acquire)
    }

    /// The current model, `None` before the first successful run.
    pub fn model(&self) -> Option<MatrixFactorization> {
        self.model.read().clone()
    }

    /// Trains a fresh model on the dataset and makes it the current one.
    ///
    /// # Arguments
    /// * `progress` - Notified after every completed epoch.
    ///
    /// # Returns
    /// The trained model, `TrainingAlreadyInProgress` if another run hasn't finished yet,
    /// or the error that aborted this run. A failed run leaves the current model as is.
    pub fn train<P>(&self, progress: &mut P) -> Result<TrainedModel>
    where
        P: Progress + ?Sized,
    {
        let _guard = TrainingGuard::acquire(&self.training)?;

        info!(
            "training on {} ratings from {} users over {} items",
            self.dataset.ratings().len(),
            self.dataset.num_users(),
            self.dataset.num_items()
        );

        let trained = build_and_train(&self.dataset, &self.config, progress)?;
        *self.model.write() = Some(trained.model.clone());

        Ok(trained)
    }

    /// Predicts the rating of `item_id` by `user_id` with the current model.
    ///
    /// # Returns
    /// A rating in `[0, 5]`, `ModelNotReady` before the first successful run or
    /// `IndexOutOfRange` for unknown ids.
    pub fn predict(&self, user_id: usize, item_id: usize) -> Result<f32> {
        self.current()?.predict(user_id, item_id)
    }

    /// The `k` items with the highest predicted rating for `user_id`.
    ///
    /// # Arguments
    /// * `user_id` - The user to recommend to.
    /// * `k` - The maximum amount of items to return.
    /// * `exclude_rated` - Whether to skip the items `user_id` already rated.
    pub fn recommend(
        &self,
        user_id: usize,
        k: usize,
        exclude_rated: bool,
    ) -> Result<Vec<(usize, f32)>> {
        let exclude = if exclude_rated {
            self.dataset.matrix().rated_by(user_id)
        } else {
            HashSet::new()
        };

        self.current()?.recommend(user_id, k, &exclude)
    }

    fn current(&self) -> Result<MatrixFactorization> {
        self.model.read().clone().ok_or(RecErr::ModelNotReady)
    }
}
