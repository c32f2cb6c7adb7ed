use rand::{Rng, seq::SliceRandom};

/// Produces mini-batches of sample indices over a fixed number of samples.
///
/// Batches are contiguous runs of the current order, the last one may be shorter.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl BatchLoader {
    /// Creates a new `BatchLoader` visiting `0..len` in order.
    ///
    /// # Panics
    /// If `batch_size` is zero.
    pub fn new(len: usize, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be > 0");

        Self {
            order: (0..len).collect(),
            batch_size,
            cursor: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The amount of batches in a full pass.
    #[inline]
    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }

    /// Permutes the visiting order and rewinds.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
        self.reset();
    }

    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns the next batch of indices, or None if exhausted.
    pub fn next_batch(&mut self) -> Option<&[usize]> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let start = self.cursor;
        let end = (start + self.batch_size).min(self.order.len());
        self.cursor = end;

        Some(&self.order[start..end])
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn batches_respect_batch_size() {
        let mut loader = BatchLoader::new(5, 2);
        assert_eq!(loader.num_batches(), 3);

        assert_eq!(loader.next_batch().unwrap(), &[0, 1]);
        assert_eq!(loader.next_batch().unwrap(), &[2, 3]);
        assert_eq!(loader.next_batch().unwrap(), &[4]);
        assert!(loader.next_batch().is_none());

        loader.reset();
        assert_eq!(loader.next_batch().unwrap(), &[0, 1]);
    }

    #[test]
    fn shuffle_is_a_seeded_permutation() {
        let mut a = BatchLoader::new(50, 50);
        let mut b = BatchLoader::new(50, 50);

        a.shuffle(&mut StdRng::seed_from_u64(7));
        b.shuffle(&mut StdRng::seed_from_u64(7));

        let first = a.next_batch().unwrap().to_vec();
        assert_eq!(first, b.next_batch().unwrap());

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn empty_loader_yields_nothing() {
        let mut loader = BatchLoader::new(0, 4);
        assert_eq!(loader.num_batches(), 0);
        assert!(loader.next_batch().is_none());
    }
}
