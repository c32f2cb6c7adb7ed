mod batch;
mod dataset;
mod error;
mod fallback;
mod loader;
mod matrix;
mod parse;
mod records;
mod source;

pub use batch::BatchLoader;
pub use dataset::Dataset;
pub use error::DataErr;
pub use fallback::{FALLBACK_ITEMS, FALLBACK_RATINGS, fallback_items, fallback_ratings};
pub use loader::DatasetLoader;
pub use matrix::{MAX_ID, RatingMatrix};
pub(crate) use matrix::split_index;
pub use parse::{parse_items, parse_ratings};
pub use records::{Item, Rating};
pub use source::{
    DEFAULT_ITEMS_URL, DEFAULT_RATINGS_URL, DataSource, EmbeddedSource, FileSource, HttpSource,
};
