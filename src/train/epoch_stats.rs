use serde::{Serialize, Deserialize};

/// Per-epoch training statistics recorded by the `Trainer`.
///
/// Loss and accuracy come from the forward pass of that epoch, i.e. they
/// describe the parameters before that epoch's update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean binary cross-entropy over the batch.
    pub loss: f64,
    /// Fraction in [0, 1] of samples whose rounded prediction matches.
    pub accuracy: f64,
    /// Wall-clock duration of this epoch in microseconds.
    pub elapsed_us: u64,
}
