use crate::data::dataset::Dataset;
use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::network::spec::LayerSpec;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{Evaluation, Trainer};

/// An attempt that finished short of 100% accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct StalledAttempt {
    pub seed: u64,
    pub accuracy: f64,
    pub loss: f64,
}

/// An evaluated training run and the seed that produced it.
pub struct TrainedRun {
    pub trainer: Trainer,
    pub evaluation: Evaluation,
    pub seed: u64,
    /// Attempts made in total, including this one.
    pub attempts: usize,
    /// Every attempt that did not solve the dataset, in seed order.
    pub stalled: Vec<StalledAttempt>,
}

impl TrainedRun {
    fn beats(&self, other: &TrainedRun) -> bool {
        self.evaluation.accuracy > other.evaluation.accuracy
            || (self.evaluation.accuracy == other.evaluation.accuracy
                && self.evaluation.loss < other.evaluation.loss)
    }
}

/// Trains a fresh network per seed (`config.seed`, `config.seed + 1`, ...)
/// until one classifies every sample correctly or `config.max_attempts`
/// runs are spent. A small ReLU network occasionally starts in a basin it
/// cannot leave, so a single seed is not enough to guarantee a solution.
///
/// Returns the first fully-correct run, otherwise the best one seen
/// (highest accuracy, then lowest loss).
pub fn train_until_solved(
    dataset: &Dataset,
    layers: &[LayerSpec],
    config: &TrainConfig,
) -> Result<TrainedRun> {
    config.validate()?;

    let mut best: Option<TrainedRun> = None;
    let mut stalled = Vec::new();
    for attempt in 1..=config.max_attempts {
        let seed = config.seed.wrapping_add(attempt as u64 - 1);
        let network = Network::from_specs(layers, seed)?;

        let mut trainer = Trainer::new(TrainConfig { seed, ..config.clone() });
        trainer.prepare(network)?;
        trainer.fit(dataset)?;
        let evaluation = trainer.evaluate(dataset)?;

        if evaluation.accuracy >= 1.0 {
            return Ok(TrainedRun { trainer, evaluation, seed, attempts: attempt, stalled });
        }
        stalled.push(StalledAttempt { seed, accuracy: evaluation.accuracy, loss: evaluation.loss });

        let run = TrainedRun { trainer, evaluation, seed, attempts: attempt, stalled: Vec::new() };
        best = match best {
            Some(prev) if !run.beats(&prev) => Some(TrainedRun { attempts: attempt, ..prev }),
            _ => Some(run),
        };
    }

    let mut best = best.ok_or_else(|| NnError::StateError("no training attempt was made".to_string()))?;
    best.stalled = stalled;
    Ok(best)
}
