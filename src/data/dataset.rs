use std::ops::Range;

use super::{Item, Rating, RatingMatrix, fallback_items};
use crate::Result;

/// Everything the recommender needs from the loader: the item catalog and the ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    items: Vec<Item>,
    matrix: RatingMatrix,
}

impl Dataset {
    pub fn new(items: Vec<Item>, matrix: RatingMatrix) -> Self {
        Self { items, matrix }
    }

    /// Creates a new `Dataset` from parsed records.
    ///
    /// # Returns
    /// A new `Dataset` or `EmptyDataset` if there are no ratings.
    pub fn from_records(items: Vec<Item>, ratings: Vec<Rating>) -> Result<Self> {
        Ok(Self::new(items, RatingMatrix::new(ratings)?))
    }

    /// The embedded sample: 5 items and 5 ratings by users 1 to 3.
    pub fn fallback() -> Self {
        Self::new(fallback_items(), RatingMatrix::fallback())
    }

    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[inline]
    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    #[inline]
    pub fn ratings(&self) -> &[Rating] {
        self.matrix.ratings()
    }

    #[inline]
    pub fn num_users(&self) -> usize {
        self.matrix.num_users()
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.matrix.num_items()
    }

    /// The selectable user ids, index `0` is reserved.
    pub fn user_ids(&self) -> Range<usize> {
        1..self.num_users()
    }

    pub fn title(&self, item_id: usize) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.title.as_str())
    }
}
