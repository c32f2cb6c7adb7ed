use super::{Item, Rating};

/// Items served when the item table can't be fetched.
pub const FALLBACK_ITEMS: [(usize, &str); 5] = [
    (1, "Toy Story (1995)"),
    (2, "GoldenEye (1995)"),
    (3, "Four Rooms (1995)"),
    (4, "Get Shorty (1995)"),
    (5, "Copycat (1995)"),
];

/// Ratings served when the rating table can't be fetched.
pub const FALLBACK_RATINGS: [(usize, usize, f32); 5] = [
    (1, 1, 5.),
    (1, 2, 3.),
    (2, 1, 4.),
    (2, 3, 5.),
    (3, 2, 4.),
];

pub fn fallback_items() -> Vec<Item> {
    FALLBACK_ITEMS
        .iter()
        .map(|&(id, title)| Item::new(id, title))
        .collect()
}

pub fn fallback_ratings() -> Vec<Rating> {
    FALLBACK_RATINGS
        .iter()
        .map(|&(user_id, item_id, rating)| Rating::new(user_id, item_id, rating))
        .collect()
}
