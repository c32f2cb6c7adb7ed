use std::ops::Range;

use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1};

use super::{ParameterLayout, RatingScale};
use crate::{RecErr, Result, data::Rating};

/// A read-only view over a flat parameter buffer.
///
/// The view *does not own* the parameters. It interprets them via `ParameterLayout` and
/// computes the forward pass and the squared error gradient of the model.
#[derive(Debug, Clone, Copy)]
pub struct FactorizationView<'a> {
    params: &'a [f32],
    layout: &'a ParameterLayout,
    scale: RatingScale,
    global_bias: f32,
}

impl<'a> FactorizationView<'a> {
    /// Creates a new `FactorizationView`.
    ///
    /// # Returns
    /// A new view or a `SizeMismatch` error if `params` doesn't match the layout.
    pub fn new(
        params: &'a [f32],
        layout: &'a ParameterLayout,
        scale: RatingScale,
        global_bias: f32,
    ) -> Result<Self> {
        if params.len() != layout.len() {
            return Err(RecErr::SizeMismatch {
                what: "parameter layout",
                got: params.len(),
                expected: layout.len(),
            });
        }

        Ok(Self {
            params,
            layout,
            scale,
            global_bias,
        })
    }

    /// The `num_users × latent_dim` user factor table.
    pub fn user_factors(&self) -> ArrayView2<'a, f32> {
        self.table(self.layout.user_factors.clone(), self.layout.shape.num_users)
    }

    /// The `num_items × latent_dim` item factor table.
    pub fn item_factors(&self) -> ArrayView2<'a, f32> {
        self.table(self.layout.item_factors.clone(), self.layout.shape.num_items)
    }

    pub fn user_bias(&self) -> ArrayView1<'a, f32> {
        ArrayView1::from(&self.params[self.layout.user_bias.clone()])
    }

    pub fn item_bias(&self) -> ArrayView1<'a, f32> {
        ArrayView1::from(&self.params[self.layout.item_bias.clone()])
    }

    /// The unscaled score `dot(user, item) + user_bias + item_bias + global_bias`.
    pub fn raw(&self, user_id: usize, item_id: usize) -> Result<f32> {
        let user = self.row(self.layout.user_row(user_id)?);
        let item = self.row(self.layout.item_row(item_id)?);
        let user_bias = self.params[self.layout.user_bias_at(user_id)?];
        let item_bias = self.params[self.layout.item_bias_at(item_id)?];

        Ok(user.dot(&item) + user_bias + item_bias + self.global_bias)
    }

    /// The scaled rating, inside the scale's bounds but not clamped.
    pub fn score(&self, user_id: usize, item_id: usize) -> Result<f32> {
        Ok(self.scale.apply(self.raw(user_id, item_id)?))
    }

    /// Accumulates into `grad` the gradient of the mean squared error over `batch`.
    ///
    /// # Arguments
    /// * `batch` - The ratings of the batch.
    /// * `grad` - A buffer with the same layout as the parameters.
    ///
    /// # Returns
    /// The summed squared error of the batch, or the first error found. On error `grad`
    /// holds a partial gradient and must not be applied.
    pub fn accumulate_grad<'r, I>(&self, batch: I, grad: &mut [f32]) -> Result<f32>
    where
        I: ExactSizeIterator<Item = &'r Rating>,
    {
        if grad.len() != self.params.len() {
            return Err(RecErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: self.params.len(),
            });
        }

        let n = batch.len() as f32;
        let mut sse = 0.;

        for rating in batch {
            let user_row = self.layout.user_row(rating.user_id)?;
            let item_row = self.layout.item_row(rating.item_id)?;
            let user_bias = self.layout.user_bias_at(rating.user_id)?;
            let item_bias = self.layout.item_bias_at(rating.item_id)?;

            let user = self.row(user_row.clone());
            let item = self.row(item_row.clone());
            let raw = user.dot(&item) + self.params[user_bias] + self.params[item_bias]
                + self.global_bias;

            let err = self.scale.apply(raw) - rating.rating;
            sse += err * err;

            let d_raw = 2. * err * self.scale.derivative(raw) / n;
            ArrayViewMut1::from(&mut grad[user_row]).scaled_add(d_raw, &item);
            ArrayViewMut1::from(&mut grad[item_row]).scaled_add(d_raw, &user);
            grad[user_bias] += d_raw;
            grad[item_bias] += d_raw;
        }

        Ok(sse)
    }

    /// The mean squared error over `ratings`, `None` if there are none.
    pub fn mse(&self, ratings: &[Rating]) -> Result<Option<f32>> {
        if ratings.is_empty() {
            return Ok(None);
        }

        let mut sse = 0.;
        for rating in ratings {
            let err = self.score(rating.user_id, rating.item_id)? - rating.rating;
            sse += err * err;
        }

        Ok(Some(sse / ratings.len() as f32))
    }

    fn row(&self, range: Range<usize>) -> ArrayView1<'a, f32> {
        ArrayView1::from(&self.params[range])
    }

    fn table(&self, range: Range<usize>, rows: usize) -> ArrayView2<'a, f32> {
        let latent_dim = self.layout.shape.latent_dim;

        ArrayView2::from_shape((rows, latent_dim), &self.params[range])
            .expect("layout sizes every table as rows * latent_dim")
    }
}
