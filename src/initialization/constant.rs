use super::ParamGen;

/// Fills a fixed amount of parameters with a single value, used for the bias tables.
pub struct ConstParamGen {
    value: f32,
    remaining: usize,
}

impl ConstParamGen {
    /// Creates a generator of `len` copies of `value`.
    pub fn new(value: f32, len: usize) -> Self {
        Self {
            value,
            remaining: len,
        }
    }

    /// Creates a generator of `len` zeros.
    pub fn zeros(len: usize) -> Self {
        Self::new(0., len)
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let take = n.min(self.remaining);
        if take == 0 {
            return None;
        }

        self.remaining -= take;
        Some(std::iter::repeat_n(self.value, take).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_table() {
        assert!(ConstParamGen::zeros(0).sample(8).is_none());
    }

    #[test]
    fn stops_at_its_length() {
        let mut biases = ConstParamGen::new(0.5, 5);

        assert_eq!(biases.sample(3).unwrap(), [0.5; 3]);
        assert_eq!(biases.sample(3).unwrap(), [0.5; 2]);
        assert!(biases.sample(1).is_none());
    }

    #[test]
    fn drains_across_chunks() {
        let mut biases = ConstParamGen::zeros(2500);
        assert_eq!(biases.sample_all(), vec![0.; 2500]);
    }
}
