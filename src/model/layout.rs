use std::ops::Range;

use crate::{RecErr, Result};

/// The largest parameter buffer a model may allocate, 1 GiB of `f32`s.
pub const MAX_PARAMS: usize = 1 << 28;

/// The dimensions of a matrix factorization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelShape {
    pub num_users: usize,
    pub num_items: usize,
    pub latent_dim: usize,
}

impl ModelShape {
    pub fn new(num_users: usize, num_items: usize, latent_dim: usize) -> Self {
        Self {
            num_users,
            num_items,
            latent_dim,
        }
    }

    /// Both factor tables plus one bias per user and per item.
    ///
    /// # Returns
    /// The amount of parameters or `ModelTooLarge` if it overflows or exceeds `MAX_PARAMS`.
    pub fn num_params(&self) -> Result<usize> {
        self.num_users
            .checked_add(self.num_items)
            .and_then(|ids| ids.checked_mul(self.latent_dim.checked_add(1)?))
            .filter(|&n| n <= MAX_PARAMS)
            .ok_or(RecErr::ModelTooLarge {
                num_users: self.num_users,
                num_items: self.num_items,
                latent_dim: self.latent_dim,
            })
    }
}

/// Maps a flat parameter buffer into the model's named tables.
///
/// Flat layout: `[user_factors | item_factors | user_bias | item_bias]`, factor tables are
/// row-major with one row of `latent_dim` values per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    pub shape: ModelShape,
    pub user_factors: Range<usize>,
    pub item_factors: Range<usize>,
    pub user_bias: Range<usize>,
    pub item_bias: Range<usize>,
}

impl ParameterLayout {
    /// Creates a new `ParameterLayout`.
    ///
    /// # Returns
    /// The layout or `ModelTooLarge` if `shape` doesn't fit in `MAX_PARAMS`.
    pub fn new(shape: ModelShape) -> Result<Self> {
        // Every offset below is bounded by the checked total.
        shape.num_params()?;

        let ModelShape {
            num_users,
            num_items,
            latent_dim,
        } = shape;

        let user_factors = 0..num_users * latent_dim;
        let item_factors = user_factors.end..user_factors.end + num_items * latent_dim;
        let user_bias = item_factors.end..item_factors.end + num_users;
        let item_bias = user_bias.end..user_bias.end + num_items;

        Ok(Self {
            shape,
            user_factors,
            item_factors,
            user_bias,
            item_bias,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.item_bias.end
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The range of the latent vector of `user_id`.
    pub fn user_row(&self, user_id: usize) -> Result<Range<usize>> {
        let user_id = check_index("user", user_id, self.shape.num_users)?;
        let start = self.user_factors.start + user_id * self.shape.latent_dim;
        Ok(start..start + self.shape.latent_dim)
    }

    /// The range of the latent vector of `item_id`.
    pub fn item_row(&self, item_id: usize) -> Result<Range<usize>> {
        let item_id = check_index("item", item_id, self.shape.num_items)?;
        let start = self.item_factors.start + item_id * self.shape.latent_dim;
        Ok(start..start + self.shape.latent_dim)
    }

    pub fn user_bias_at(&self, user_id: usize) -> Result<usize> {
        let user_id = check_index("user", user_id, self.shape.num_users)?;
        Ok(self.user_bias.start + user_id)
    }

    pub fn item_bias_at(&self, item_id: usize) -> Result<usize> {
        let item_id = check_index("item", item_id, self.shape.num_items)?;
        Ok(self.item_bias.start + item_id)
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<usize> {
    if index >= len {
        return Err(RecErr::IndexOutOfRange { what, index, len });
    }

    Ok(index)
}
