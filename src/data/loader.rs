use log::{debug, info, warn};

use super::{
    DataSource, Dataset, Item, RatingMatrix, fallback_items,
    error::{DataErr, Result},
    parse_items, parse_ratings,
};
use crate::RecErr;

/// Loads a `Dataset` out of a `DataSource`, never failing.
///
/// Each table is fetched on its own, a table that can't be fetched or that holds no valid
/// rows is replaced by the embedded sample.
pub struct DatasetLoader<S: DataSource> {
    source: S,
}

impl<S: DataSource> DatasetLoader<S> {
    /// Creates a new `DatasetLoader`.
    ///
    /// # Arguments
    /// * `source` - Where to read the raw tables from.
    ///
    /// # Returns
    /// A new `DatasetLoader` instance.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetches and parses both tables.
    ///
    /// # Returns
    /// The loaded dataset, partially or entirely replaced by the embedded sample on failure.
    pub fn load(&self) -> Dataset {
        debug!(source = self.source.name(); "loading items");
        let items = self.load_items();

        debug!(source = self.source.name(); "loading ratings");
        let matrix = self.load_ratings();

        let dataset = Dataset::new(items, matrix);
        info!(
            "data loaded: {} users, {} items, {} ratings",
            dataset.num_users(),
            dataset.num_items(),
            dataset.ratings().len()
        );

        dataset
    }

    fn load_items(&self) -> Vec<Item> {
        let items = self.source.items().map(|text| parse_items(&text));

        match items {
            Ok(items) => items,
            Err(e) => {
                warn!("using fallback item data: {e}");
                fallback_items()
            }
        }
    }

    fn load_ratings(&self) -> RatingMatrix {
        match self.try_load_ratings() {
            Ok(matrix) => matrix,
            Err(e) => {
                warn!("using fallback rating data: {e}");
                RatingMatrix::fallback()
            }
        }
    }

    fn try_load_ratings(&self) -> Result<RatingMatrix> {
        let ratings = parse_ratings(&self.source.ratings()?);
        RatingMatrix::new(ratings).map_err(|e| match e {
            RecErr::EmptyDataset => DataErr::Empty { table: "ratings" },
            e => DataErr::Invalid {
                table: "ratings",
                reason: e.to_string(),
            },
        })
    }
}
