use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::optim::optimizer::OptimizerKind;

/// Configuration for a training run.
///
/// # Fields
/// - `epochs`        : full-batch passes over the dataset
/// - `learning_rate` : step size handed to the optimizer
/// - `optimizer`     : which optimizer to build for the network
/// - `seed`          : seed for parameter initialization
/// - `log_every`     : print progress every `n` epochs; `None` trains silently
/// - `max_attempts`  : how many seeds (`seed`, `seed + 1`, ...) a restarted
///                     run may try before settling for its best result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub optimizer: OptimizerKind,
    pub seed: u64,
    pub log_every: Option<usize>,
    pub max_attempts: usize,
}

impl TrainConfig {
    /// Creates a silent, single-attempt `TrainConfig`.
    pub fn new(epochs: usize, learning_rate: f64, optimizer: OptimizerKind, seed: u64) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            optimizer,
            seed,
            log_every: None,
            max_attempts: 1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NnError::StateError("epochs must be at least 1".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(NnError::StateError("max_attempts must be at least 1".to_string()));
        }
        if self.log_every == Some(0) {
            return Err(NnError::StateError("log_every must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    /// Adam at lr 0.01 for 1000 epochs, seed 42, up to 8 attempts.
    fn default() -> Self {
        TrainConfig {
            epochs: 1000,
            learning_rate: 0.01,
            optimizer: OptimizerKind::adam(),
            seed: 42,
            log_every: None,
            max_attempts: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_reference_run() {
        let config = TrainConfig::default();
        assert_eq!(config.epochs, 1000);
        assert_eq!(config.learning_rate, 0.01);
        assert_eq!(config.optimizer, OptimizerKind::adam());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_counts() {
        let mut config = TrainConfig::new(0, 0.1, OptimizerKind::Sgd { momentum: 0.0 }, 0);
        assert!(config.validate().is_err());
        config.epochs = 10;
        config.log_every = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = TrainConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"adam\""));
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
