use std::{
    cell::RefCell,
    collections::HashSet,
    rc::Rc,
    sync::{Arc, atomic::AtomicBool, atomic::Ordering},
};

use log::info;
use rand::Rng;

use super::{FactorInit, FactorizationView, ModelShape, ParameterLayout, RatingScale};
use crate::{
    RecErr, Result,
    initialization::ParamGen,
    storage::ParameterStore,
    training::TrainingGuard,
};

/// A latent factor collaborative filtering model with per-user and per-item biases.
///
/// Cloning is cheap and every clone shares the same parameters, the trainer writes them
/// while clones keep serving predictions.
#[derive(Debug, Clone)]
pub struct MatrixFactorization {
    layout: ParameterLayout,
    scale: RatingScale,
    global_bias: f32,
    store: ParameterStore,
    training: Arc<AtomicBool>,
}

impl MatrixFactorization {
    /// Builds a new untrained model.
    ///
    /// # Arguments
    /// * `shape` - The amount of users, items and latent dimensions.
    /// * `init` - How to initialize the factor tables.
    /// * `rng` - The random number generator for the initial factors.
    ///
    /// # Returns
    /// A new `MatrixFactorization` or an `InvalidConfig` error if `init` is invalid.
    pub fn build<R>(shape: ModelShape, init: &FactorInit, rng: Rc<RefCell<R>>) -> Result<Self>
    where
        R: Rng + 'static,
    {
        let layout = ParameterLayout::new(shape)?;
        let params = init.param_gen(&layout, rng)?.sample_all();
        let model = Self::with_layout(layout, params)?;

        info!(
            "model built: {} users, {} items, latent dimension {}, {} parameters",
            shape.num_users,
            shape.num_items,
            shape.latent_dim,
            model.num_params()
        );

        Ok(model)
    }

    /// Creates a model over already existing parameters.
    ///
    /// # Arguments
    /// * `shape` - The shape of the model.
    /// * `params` - A flat buffer following `ParameterLayout`.
    ///
    /// # Returns
    /// A new `MatrixFactorization`, `ModelTooLarge` or a `SizeMismatch` error.
    pub fn from_params(shape: ModelShape, params: Vec<f32>) -> Result<Self> {
        Self::with_layout(ParameterLayout::new(shape)?, params)
    }

    fn with_layout(layout: ParameterLayout, params: Vec<f32>) -> Result<Self> {
        if params.len() != layout.len() {
            return Err(RecErr::SizeMismatch {
                what: "parameter layout",
                got: params.len(),
                expected: layout.len(),
            });
        }

        let scale = RatingScale::default();

        Ok(Self {
            layout,
            global_bias: scale.midpoint(),
            scale,
            store: ParameterStore::new(params),
            training: Arc::new(AtomicBool::new(false)),
        })
    }

    #[inline]
    pub fn shape(&self) -> ModelShape {
        self.layout.shape
    }

    #[inline]
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    #[inline]
    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    #[inline]
    pub fn num_params(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn is_training(&self) -> bool {
        self.training.load(Ordering::Acquire)
    }

    /// Marks the model as being trained until the guard is dropped.
    ///
    /// # Returns
    /// The guard or `TrainingAlreadyInProgress`.
    pub fn begin_training(&self) -> Result<TrainingGuard<'_>> {
        TrainingGuard::acquire(&self.training)
    }

    /// Interprets `params` with this model's layout and output scale.
    pub fn view<'a>(&'a self, params: &'a [f32]) -> Result<FactorizationView<'a>> {
        FactorizationView::new(params, &self.layout, self.scale, self.global_bias)
    }

    /// The scaled rating of `item_id` by `user_id` before clamping.
    pub fn score(&self, user_id: usize, item_id: usize) -> Result<f32> {
        let params = self.store.read();
        self.view(&params)?.score(user_id, item_id)
    }

    /// Predicts the rating of `item_id` by `user_id`.
    ///
    /// # Returns
    /// A rating in `[0, 5]`, `IndexOutOfRange` if either id has no row in the model or
    /// `NonFiniteScore` if the parameters involved can't produce a rating.
    pub fn predict(&self, user_id: usize, item_id: usize) -> Result<f32> {
        rating(self.score(user_id, item_id)?, user_id, item_id)
    }

    pub fn user_embedding(&self, user_id: usize) -> Result<Vec<f32>> {
        let range = self.layout.user_row(user_id)?;
        Ok(self.store.read()[range].to_vec())
    }

    pub fn item_embedding(&self, item_id: usize) -> Result<Vec<f32>> {
        let range = self.layout.item_row(item_id)?;
        Ok(self.store.read()[range].to_vec())
    }

    /// Ranks every item for `user_id` by predicted rating.
    ///
    /// # Arguments
    /// * `user_id` - The user to recommend to.
    /// * `k` - The maximum amount of items to return.
    /// * `exclude` - Item ids that must not be recommended, usually the already rated ones.
    ///
    /// # Returns
    /// Up to `k` `(item_id, rating)` pairs, best first.
    pub fn recommend(
        &self,
        user_id: usize,
        k: usize,
        exclude: &HashSet<usize>,
    ) -> Result<Vec<(usize, f32)>> {
        let params = self.store.read();
        let view = self.view(&params)?;

        // Index 0 is reserved, it never belongs to an item.
        let mut ranked = (1..self.layout.shape.num_items)
            .filter(|item_id| !exclude.contains(item_id))
            .map(|item_id| {
                let score = view.score(user_id, item_id)?;
                Ok((item_id, rating(score, user_id, item_id)?))
            })
            .collect::<Result<Vec<_>>>()?;

        ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        ranked.truncate(k);
        Ok(ranked)
    }
}

fn rating(score: f32, user_id: usize, item_id: usize) -> Result<f32> {
    RatingScale::clamp(score).ok_or(RecErr::NonFiniteScore { user_id, item_id })
}
