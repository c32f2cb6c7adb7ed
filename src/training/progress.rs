use log::info;

/// What a trainer reports after every completed epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    /// Zero based index of the epoch.
    pub epoch: usize,
    /// Mean squared error over the training portion.
    pub loss: f32,
    /// Mean squared error over the validation portion, `None` when it's empty.
    pub val_loss: Option<f32>,
}

/// Observes the training run, called once per completed epoch.
pub trait Progress {
    fn on_epoch_end(&mut self, stats: &EpochStats);
}

impl<F: FnMut(&EpochStats)> Progress for F {
    fn on_epoch_end(&mut self, stats: &EpochStats) {
        self(stats)
    }
}

/// Writes every epoch to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn on_epoch_end(&mut self, stats: &EpochStats) {
        let EpochStats {
            epoch,
            loss,
            val_loss,
        } = *stats;

        match val_loss {
            Some(val_loss) => {
                info!(epoch = epoch; "loss {loss:.4}, validation loss {val_loss:.4}")
            }
            None => info!(epoch = epoch; "loss {loss:.4}"),
        }
    }
}
