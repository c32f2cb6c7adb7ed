/// A `ParamGen` generates values for the initial state of the model's parameters.
pub trait ParamGen {
    /// Should sample at most `n` parameters.
    ///
    /// # Arguments
    /// * `n` - The upper limit of samples to generate.
    ///
    /// # Returns
    /// An option whether the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;

    /// Drains the generator into a single buffer.
    fn sample_all(&mut self) -> Vec<f32> {
        const CHUNK: usize = 1024;

        let mut params = Vec::new();
        while let Some(sample) = self.sample(CHUNK) {
            params.extend(sample);
        }

        params
    }
}
