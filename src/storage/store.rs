use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::{RecErr, Result, optimization::Optimizer};

/// The model's flat parameter buffer, shared between the trainer and any number of readers.
///
/// Writes happen only through `update_params`, which holds the write lock for a single
/// optimizer step; readers either borrow the buffer through `read` or copy it out.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    nparams: usize,
    params: Arc<RwLock<Box<[f32]>>>,
}

impl ParameterStore {
    /// Creates a new `ParameterStore`.
    ///
    /// # Arguments
    /// * `params` - The initial state of the parameters.
    ///
    /// # Returns
    /// A new `ParameterStore` instance.
    pub fn new(params: Vec<f32>) -> Self {
        Self {
            nparams: params.len(),
            params: Arc::new(RwLock::new(params.into_boxed_slice())),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nparams
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nparams == 0
    }

    /// Locks the parameters for reading, blocking while an update is being applied.
    pub fn read(&self) -> RwLockReadGuard<'_, Box<[f32]>> {
        self.params.read()
    }

    /// Applies one optimizer step with `grad` under the write lock.
    ///
    /// # Arguments
    /// * `optimizer` - The optimization algorithm.
    /// * `grad` - The gradient for the entire buffer.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `grad` isn't the same size as the buffer.
    pub fn update_params<O>(&self, optimizer: &mut O, grad: &[f32]) -> Result<()>
    where
        O: Optimizer + ?Sized,
    {
        if grad.len() != self.nparams {
            return Err(RecErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: self.nparams,
            });
        }

        let mut params = self.params.write();
        optimizer.update_params(grad, &mut params)
    }

    /// Copies the parameters into the provided destination buffer.
    ///
    /// # Arguments
    /// * `out` - A mutable slice where the parameters will be copied.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `out` isn't the same size as the buffer.
    pub fn pull_params(&self, out: &mut [f32]) -> Result<()> {
        if self.nparams != out.len() {
            return Err(RecErr::SizeMismatch {
                what: "parameter buffer",
                got: out.len(),
                expected: self.nparams,
            });
        }

        out.copy_from_slice(&self.params.read());
        Ok(())
    }
}
