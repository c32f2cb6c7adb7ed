use std::collections::HashSet;

use super::{Rating, fallback_ratings};

/// The largest user or item id a matrix accepts, tables are sized `max id + 1`.
pub const MAX_ID: usize = 1 << 20;
use crate::{RecErr, Result};

/// The observed entries of the sparse user × item rating matrix.
///
/// The cardinalities are `max id + 1` on each axis, so every stored triple is a valid row
/// index into tables sized by them.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    ratings: Vec<Rating>,
    num_users: usize,
    num_items: usize,
}

impl RatingMatrix {
    /// Creates a new `RatingMatrix`.
    ///
    /// # Arguments
    /// * `ratings` - The observed triples, their order is kept.
    ///
    /// # Returns
    /// A new `RatingMatrix`, `EmptyDataset` if there are no ratings or `IdTooLarge` if an
    /// id is above `MAX_ID`.
    pub fn new(ratings: Vec<Rating>) -> Result<Self> {
        let (num_users, num_items) = cardinalities(&ratings)?;

        Ok(Self {
            ratings,
            num_users,
            num_items,
        })
    }

    /// The matrix holding the embedded sample ratings.
    pub fn fallback() -> Self {
        let ratings = fallback_ratings();
        let (num_users, num_items) = cardinalities(&ratings).unwrap_or_default();

        Self {
            ratings,
            num_users,
            num_items,
        }
    }

    #[inline]
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    #[inline]
    pub fn num_users(&self) -> usize {
        self.num_users
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Splits the ratings into a training and a trailing validation portion.
    ///
    /// # Arguments
    /// * `validation_split` - The fraction of ratings to hold out, in `[0, 1)`.
    ///
    /// # Returns
    /// The `(train, validation)` slices.
    pub fn split(&self, validation_split: f32) -> (&[Rating], &[Rating]) {
        let at = split_index(self.ratings.len(), validation_split);
        self.ratings.split_at(at)
    }

    /// Returns the ids of every item `user_id` has rated.
    pub fn rated_by(&self, user_id: usize) -> HashSet<usize> {
        self.ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.item_id)
            .collect()
    }
}

/// The index where the validation portion starts, `floor(len * (1 - validation_split))`.
pub(crate) fn split_index(len: usize, validation_split: f32) -> usize {
    // Absorbs the f32 -> f64 widening error, 0.1f32 is slightly above 0.1.
    const EPSILON: f64 = 1e-6;

    let keep = 1. - f64::from(validation_split.clamp(0., 1.));
    ((len as f64 * keep + EPSILON).floor() as usize).min(len)
}

fn cardinalities(ratings: &[Rating]) -> Result<(usize, usize)> {
    let num_users = cardinality("user", ratings.iter().map(|r| r.user_id))?;
    let num_items = cardinality("item", ratings.iter().map(|r| r.item_id))?;
    Ok((num_users, num_items))
}

fn cardinality<I>(what: &'static str, ids: I) -> Result<usize>
where
    I: Iterator<Item = usize>,
{
    let max = ids.max().ok_or(RecErr::EmptyDataset)?;

    max.checked_add(1)
        .filter(|_| max <= MAX_ID)
        .ok_or(RecErr::IdTooLarge {
            what,
            id: max,
            max: MAX_ID,
        })
}
