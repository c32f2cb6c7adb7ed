use std::sync::atomic::{AtomicBool, Ordering};

use crate::{RecErr, Result};

/// Holds a "training in progress" flag raised for as long as it lives.
///
/// The flag is lowered on drop, so a run that returns early, fails or panics releases it.
#[derive(Debug)]
pub struct TrainingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TrainingGuard<'a> {
    /// Raises `flag`.
    ///
    /// # Returns
    /// The guard or `TrainingAlreadyInProgress` if the flag was already raised.
    pub fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RecErr::TrainingAlreadyInProgress)?;

        Ok(Self { flag })
    }
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let flag = AtomicBool::new(false);

        let guard = TrainingGuard::acquire(&flag).unwrap();
        assert!(matches!(
            TrainingGuard::acquire(&flag),
            Err(RecErr::TrainingAlreadyInProgress)
        ));

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(TrainingGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn released_on_panic() {
        let flag = AtomicBool::new(false);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = TrainingGuard::acquire(&flag).unwrap();
            panic!("boom");
        }));

        assert!(result.is_err());
        assert!(!flag.load(Ordering::Acquire));
    }
}
