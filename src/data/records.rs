/// A rateable item, a movie in the MovieLens tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: usize,
    pub title: String,
}

impl Item {
    pub fn new(id: usize, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// A single observed (user, item, rating) triple.
///
/// Ids are used as dense row indices into the model's tables, index `0` is never
/// observed in the source data but still gets a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub user_id: usize,
    pub item_id: usize,
    pub rating: f32,
}

impl Rating {
    pub fn new(user_id: usize, item_id: usize, rating: f32) -> Self {
        Self {
            user_id,
            item_id,
            rating,
        }
    }
}
