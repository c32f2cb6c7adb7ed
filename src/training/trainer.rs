use log::{debug, info};
use rand::{Rng, rngs::StdRng};

use super::{EpochStats, Progress, TrainingConfig, TrainingReport};
use crate::{
    RecErr, Result,
    data::{BatchLoader, Rating, split_index},
    model::MatrixFactorization,
    optimization::Optimizer,
};

/// Runs mini-batch training of a `MatrixFactorization` over a sequence of ratings.
pub struct Trainer<O: Optimizer, R: Rng> {
    optimizer: O,
    rng: R,
    grad: Vec<f32>,

    epochs: usize,
    batch_size: usize,
    validation_split: f32,
    shuffle: bool,
}

impl<O: Optimizer, R: Rng> Trainer<O, R> {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `optimizer` - Applies the batch gradients, sized for the model to train.
    /// * `rng` - Shuffles the training portion between epochs.
    /// * `epochs` - The amount of passes over the training portion.
    /// * `batch_size` - The maximum amount of ratings per gradient step.
    /// * `validation_split` - The trailing fraction of ratings held out, in `[0, 1)`.
    /// * `shuffle` - Whether to shuffle the training portion before every epoch.
    pub fn new(
        optimizer: O,
        rng: R,
        epochs: usize,
        batch_size: usize,
        validation_split: f32,
        shuffle: bool,
    ) -> Self {
        Self {
            optimizer,
            rng,
            grad: Vec::new(),
            epochs,
            batch_size,
            validation_split,
            shuffle,
        }
    }
}

impl Trainer<Box<dyn Optimizer + Send>, StdRng> {
    /// Creates a `Trainer` following `config` for a model of `nparams` parameters.
    pub fn from_config(config: &TrainingConfig, nparams: usize, rng: StdRng) -> Self {
        Self::new(
            config.build_optimizer(nparams),
            rng,
            config.epochs,
            config.batch_size,
            config.validation_split,
            config.shuffle,
        )
    }
}

impl<O: Optimizer, R: Rng> Trainer<O, R> {
    /// Trains `model` on `ratings`.
    ///
    /// The trailing `validation_split` fraction of `ratings` is held out and only used to
    /// report a validation loss. The model's parameters are updated in place; if the run
    /// fails they keep the values of the last applied batch.
    ///
    /// # Arguments
    /// * `model` - The model to train, no other run may be training it.
    /// * `ratings` - The observed triples, in their dataset order.
    /// * `progress` - Notified after every completed epoch.
    ///
    /// # Returns
    /// The loss trajectory or an error if the run couldn't start or was aborted.
    pub fn train<P>(
        &mut self,
        model: &MatrixFactorization,
        ratings: &[Rating],
        progress: &mut P,
    ) -> Result<TrainingReport>
    where
        P: Progress + ?Sized,
    {
        let _guard = model.begin_training()?;

        let at = split_index(ratings.len(), self.validation_split);
        let (train, validation) = ratings.split_at(at);
        if train.is_empty() {
            return Err(RecErr::EmptyTrainingSet {
                total: ratings.len(),
                validation_split: self.validation_split,
            });
        }

        if self.batch_size == 0 {
            return Err(RecErr::InvalidConfig("batch_size must be at least 1".into()));
        }

        self.grad.clear();
        self.grad.resize(model.num_params(), 0.);

        let mut loader = BatchLoader::new(train.len(), self.batch_size);
        let mut report = TrainingReport::with_capacity(self.epochs);

        debug!(
            "training on {} ratings, validating on {}, {} batches per epoch",
            train.len(),
            validation.len(),
            loader.num_batches()
        );

        for epoch in 0..self.epochs {
            if self.shuffle {
                loader.shuffle(&mut self.rng);
            } else {
                loader.reset();
            }

            let mut sse = 0.;
            let mut batch = 0;

            while let Some(indices) = loader.next_batch() {
                sse += self
                    .step(model, indices.iter().map(|&i| &train[i]))
                    .map_err(|e| e.during(epoch, batch))?;
                batch += 1;
            }

            let loss = sse / train.len() as f32;
            let val_loss =
                Self::evaluate(model, train, validation).map_err(|e| e.during(epoch, batch))?;

            debug!(epoch = epoch; "loss {loss}, validation loss {val_loss:?}");

            report.push(loss, val_loss);
            progress.on_epoch_end(&EpochStats {
                epoch,
                loss,
                val_loss,
            });
        }

        info!(
            "training finished after {} epochs, final loss {:?}",
            report.epochs(),
            report.final_loss()
        );

        Ok(report)
    }

    /// Checks the parameters left by the epoch's last update and measures the validation
    /// loss.
    ///
    /// # Returns
    /// The validation loss, `NonFiniteParams` if a parameter is no longer finite or
    /// `NonFiniteLoss` if either portion can't be scored anymore.
    fn evaluate(
        model: &MatrixFactorization,
        train: &[Rating],
        validation: &[Rating],
    ) -> Result<Option<f32>> {
        let params = model.store().read();

        if let Some(index) = params.iter().position(|p| !p.is_finite()) {
            return Err(RecErr::NonFiniteParams { index });
        }

        // Finite parameters can still overflow into NaN scores.
        let view = model.view(&params)?;
        let fitted = view.mse(train)?;
        let val_loss = view.mse(validation)?;

        for loss in [fitted, val_loss].into_iter().flatten() {
            if !loss.is_finite() {
                return Err(RecErr::NonFiniteLoss { loss });
            }
        }

        Ok(val_loss)
    }

    /// Computes the gradient of one batch under the read lock and applies it under the
    /// write lock.
    ///
    /// # Returns
    /// The summed squared error of the batch.
    fn step<'r, I>(&mut self, model: &MatrixFactorization, batch: I) -> Result<f32>
    where
        I: ExactSizeIterator<Item = &'r Rating>,
    {
        self.grad.fill(0.);

        let sse = {
            let params = model.store().read();
            model.view(&params)?.accumulate_grad(batch, &mut self.grad)?
        };

        if !sse.is_finite() {
            return Err(RecErr::NonFiniteLoss { loss: sse });
        }

        model.store().update_params(&mut self.optimizer, &self.grad)?;
        Ok(sse)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rand::SeedableRng;

    use super::*;
    use crate::{
        model::{FactorInit, ModelShape},
        optimization::GradientDescent,
    };

    fn model(num_users: usize, num_items: usize) -> MatrixFactorization {
        let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(5)));
        let shape = ModelShape::new(num_users, num_items, 4);
        MatrixFactorization::build(shape, &FactorInit::default(), rng).unwrap()
    }

    fn trainer(epochs: usize, validation_split: f32) -> Trainer<GradientDescent, StdRng> {
        let rng = StdRng::seed_from_u64(0);
        Trainer::new(GradientDescent::new(0.5), rng, epochs, 2, validation_split, true)
    }

    fn ratings() -> Vec<Rating> {
        vec![
            Rating::new(1, 1, 5.),
            Rating::new(1, 2, 1.),
            Rating::new(2, 1, 4.),
            Rating::new(2, 2, 2.),
            Rating::new(1, 1, 5.),
        ]
    }

    #[test]
    fn one_progress_event_per_epoch() {
        let model = model(3, 3);
        let mut events = Vec::new();

        let report = trainer(4, 0.2)
            .train(&model, &ratings(), &mut |stats: &EpochStats| events.push(*stats))
            .unwrap();

        assert_eq!(report.epochs(), 4);
        assert_eq!(events.len(), 4);
        assert_eq!(
            events.iter().map(|e| e.epoch).collect::<Vec<_>>(),
            [0, 1, 2, 3]
        );
        assert!(events.iter().all(|e| e.val_loss.is_some()));
        assert_eq!(report.losses, events.iter().map(|e| e.loss).collect::<Vec<_>>());
        assert!(!model.is_training());
    }

    #[test]
    fn loss_goes_down() {
        let model = model(3, 3);
        let report = trainer(30, 0.)
            .train(&model, &ratings(), &mut |_: &EpochStats| {})
            .unwrap();

        assert!(report.final_loss().unwrap() < report.losses[0]);
        assert!(report.val_losses.iter().all(Option::is_none));
    }

    #[test]
    fn empty_training_portion() {
        let model = model(3, 3);
        let result = trainer(1, 0.5).train(&model, &ratings()[..1], &mut |_: &EpochStats| {});

        assert!(matches!(
            result,
            Err(RecErr::EmptyTrainingSet { total: 1, .. })
        ));
        assert!(!model.is_training());
    }

    #[test]
    fn bad_id_aborts_with_context() {
        let model = model(3, 3);
        let mut ratings = ratings();
        ratings.push(Rating::new(9, 1, 3.));

        let rng = StdRng::seed_from_u64(0);
        let mut trainer = Trainer::new(GradientDescent::new(0.1), rng, 3, 2, 0., false);
        let result = trainer.train(&model, &ratings, &mut |_: &EpochStats| {});

        // The sixth rating lands in the third batch of the first epoch.
        let Err(RecErr::TrainingFailure {
            epoch,
            batch,
            cause,
        }) = result
        else {
            panic!("expected a training failure");
        };
        assert_eq!((epoch, batch), (0, 2));
        assert!(matches!(
            *cause,
            RecErr::IndexOutOfRange {
                what: "user",
                index: 9,
                ..
            }
        ));
        assert!(!model.is_training());
    }

    #[test]
    fn diverging_run_is_aborted() {
        let model = model(3, 3);
        let ratings = vec![Rating::new(1, 1, f32::INFINITY), Rating::new(2, 2, 3.)];

        let result = trainer(2, 0.).train(&model, &ratings, &mut |_: &EpochStats| {});

        let Err(RecErr::TrainingFailure { epoch: 0, cause, .. }) = result else {
            panic!("expected a training failure");
        };
        assert!(matches!(*cause, RecErr::NonFiniteLoss { .. }));
    }

    /// Overwrites the parameters with a fixed buffer on every step.
    struct Overwrite(Vec<f32>);

    impl Optimizer for Overwrite {
        fn update_params(&mut self, _grad: &[f32], params: &mut [f32]) -> Result<()> {
            params.copy_from_slice(&self.0);
            Ok(())
        }
    }

    fn single_step(model: &MatrixFactorization, params: Vec<f32>) -> Result<TrainingReport> {
        let rng = StdRng::seed_from_u64(0);
        let mut trainer = Trainer::new(Overwrite(params), rng, 1, 8, 0., false);
        trainer.train(model, &ratings(), &mut |_: &EpochStats| {})
    }

    #[test]
    fn last_update_writing_nan_fails_the_run() {
        let model = model(3, 3);
        let mut params = vec![0.; model.num_params()];
        params[5] = f32::NAN;

        let Err(RecErr::TrainingFailure {
            epoch: 0, cause, ..
        }) = single_step(&model, params)
        else {
            panic!("expected a training failure");
        };
        assert!(matches!(*cause, RecErr::NonFiniteParams { index: 5 }));
        assert!(!model.is_training());
    }

    #[test]
    fn last_update_overflowing_the_scores_fails_the_run() {
        let model = model(3, 3);
        let layout = model.layout().clone();

        // Every dot product sums +inf and -inf.
        let mut params = vec![0.; layout.len()];
        params[layout.user_factors.clone()].fill(1e30);
        for (i, p) in params[layout.item_factors.clone()].iter_mut().enumerate() {
            *p = if i % 2 == 0 { 1e30 } else { -1e30 };
        }

        let Err(RecErr::TrainingFailure { cause, .. }) = single_step(&model, params) else {
            panic!("expected a training failure");
        };
        assert!(matches!(*cause, RecErr::NonFiniteLoss { .. }));
    }

    #[test]
    fn concurrent_run_is_rejected() {
        let model = model(3, 3);
        let _guard = model.begin_training().unwrap();

        let result = trainer(1, 0.).train(&model, &ratings(), &mut |_: &EpochStats| {});
        assert!(matches!(result, Err(RecErr::TrainingAlreadyInProgress)));
    }
}
