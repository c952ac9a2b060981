use std::time::Instant;

use crate::data::dataset::Dataset;
use crate::error::{NnError, Result};
use crate::loss::bce::BceLoss;
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Lifecycle of a `Trainer`. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Uninitialized,
    Ready,
    Training,
    Completed,
    Evaluated,
}

/// One row of the final prediction report.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePrediction {
    pub input: Vec<f64>,
    pub target: f64,
    pub probability: f64,
    pub label: u8,
}

/// Final loss, accuracy and per-sample predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
    pub predictions: Vec<SamplePrediction>,
}

/// Owns the network and optimizer for one training run and drives the
/// full-batch epoch loop.
pub struct Trainer {
    config: TrainConfig,
    network: Option<Network>,
    optimizer: Option<Box<dyn Optimizer>>,
    state: TrainerState,
    history: Vec<EpochStats>,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Trainer {
        Trainer {
            config,
            network: None,
            optimizer: None,
            state: TrainerState::Uninitialized,
            history: Vec::new(),
        }
    }

    /// Builds the optimizer named in the config for `network` and moves
    /// Uninitialized → Ready.
    pub fn prepare(&mut self, network: Network) -> Result<()> {
        let optimizer = self.config.optimizer.build(&network, self.config.learning_rate)?;
        self.prepare_with(network, optimizer)
    }

    /// Like `prepare`, with a caller-supplied optimizer.
    pub fn prepare_with(&mut self, network: Network, optimizer: Box<dyn Optimizer>) -> Result<()> {
        self.expect_state(&[TrainerState::Uninitialized], "prepare")?;
        self.config.validate()?;
        self.network = Some(network);
        self.optimizer = Some(optimizer);
        self.state = TrainerState::Ready;
        Ok(())
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn history(&self) -> &[EpochStats] {
        &self.history
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn optimizer_name(&self) -> Option<&'static str> {
        self.optimizer.as_ref().map(|o| o.name())
    }

    fn expect_state(&self, allowed: &[TrainerState], op: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(NnError::StateError(format!(
                "{op} is not allowed while the trainer is {:?}", self.state
            )))
        }
    }

    fn check_dataset(network: &Network, dataset: &Dataset) -> Result<()> {
        if dataset.input_size() != network.input_size() || dataset.target_size() != network.output_size() {
            return Err(NnError::ShapeMismatch(format!(
                "dataset is {} → {}, network is {} → {}",
                dataset.input_size(), dataset.target_size(),
                network.input_size(), network.output_size()
            )));
        }
        Ok(())
    }

    /// One epoch: forward, loss, backward, optimizer step. Allowed in Ready
    /// (entering Training) and Training; the step that reaches
    /// `config.epochs` moves to Completed. Returns the epoch's loss.
    pub fn step(&mut self, dataset: &Dataset) -> Result<f64> {
        self.expect_state(&[TrainerState::Ready, TrainerState::Training], "a training step")?;
        if self.history.len() >= self.config.epochs {
            return Err(NnError::StateError(format!(
                "all {} epochs have already run", self.config.epochs
            )));
        }
        let (network, optimizer) = match (self.network.as_mut(), self.optimizer.as_mut()) {
            (Some(n), Some(o)) => (n, o),
            _ => return Err(NnError::StateError(
                "training step before network and optimizer were constructed".to_string()
            )),
        };
        Trainer::check_dataset(network, dataset)?;

        let t_start = Instant::now();

        let output = network.forward(dataset.inputs())?;
        let loss = BceLoss::loss(&output, dataset.targets())?;
        let accuracy = BceLoss::accuracy(&output, dataset.targets())?;
        let grad_output = BceLoss::derivative(&output, dataset.targets())?;
        let grads = network.backward(&grad_output)?;
        optimizer.step(network, &grads)?;

        let stats = EpochStats {
            epoch: self.history.len() + 1,
            total_epochs: self.config.epochs,
            loss,
            accuracy,
            elapsed_us: t_start.elapsed().as_micros() as u64,
        };
        if let Some(every) = self.config.log_every {
            if stats.epoch % every == 0 {
                println!(
                    "Epoch {}: loss = {:.6}, accuracy = {:.2}%",
                    stats.epoch, stats.loss, stats.accuracy * 100.0
                );
            }
        }
        let done = stats.epoch >= self.config.epochs;
        self.history.push(stats);
        self.state = if done { TrainerState::Completed } else { TrainerState::Training };

        Ok(loss)
    }

    /// Runs `config.epochs` epochs from Ready and ends in Completed.
    /// Returns the loss of the last epoch.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<f64> {
        self.expect_state(&[TrainerState::Ready], "fit")?;
        let mut last_loss = f64::NAN;
        while self.state != TrainerState::Completed {
            last_loss = self.step(dataset)?;
        }
        Ok(last_loss)
    }

    /// Final metrics on the trained network. Allowed once training has
    /// completed; moves to Evaluated.
    pub fn evaluate(&mut self, dataset: &Dataset) -> Result<Evaluation> {
        self.expect_state(&[TrainerState::Completed, TrainerState::Evaluated], "evaluate")?;
        let network = self.network.as_ref().ok_or_else(|| NnError::StateError(
            "evaluate without a network".to_string()
        ))?;
        Trainer::check_dataset(network, dataset)?;

        let output = network.predict(dataset.inputs())?;
        let loss = BceLoss::loss(&output, dataset.targets())?;
        let accuracy = BceLoss::accuracy(&output, dataset.targets())?;

        let predictions = dataset.inputs().data.iter()
            .zip(dataset.targets().data.iter())
            .zip(output.data.iter())
            .map(|((input, target), out)| SamplePrediction {
                input: input.clone(),
                target: target[0],
                probability: out[0],
                label: if out[0].round() >= 1.0 { 1 } else { 0 },
            })
            .collect();

        self.state = TrainerState::Evaluated;
        Ok(Evaluation { loss, accuracy, predictions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::spec::xor_architecture;
    use crate::optim::optimizer::OptimizerKind;
    use crate::optim::sgd::Sgd;

    fn sgd_config(epochs: usize) -> TrainConfig {
        TrainConfig::new(epochs, 0.1, OptimizerKind::Sgd { momentum: 0.0 }, 3)
    }

    fn network() -> Network {
        Network::from_specs(&xor_architecture(), 3).unwrap()
    }

    #[test]
    fn walks_through_every_state_in_order() {
        let data = Dataset::xor();
        let mut trainer = Trainer::new(sgd_config(5));
        assert_eq!(trainer.state(), TrainerState::Uninitialized);

        trainer.prepare(network()).unwrap();
        assert_eq!(trainer.state(), TrainerState::Ready);
        assert_eq!(trainer.optimizer_name(), Some("SGD"));

        trainer.fit(&data).unwrap();
        assert_eq!(trainer.state(), TrainerState::Completed);
        assert_eq!(trainer.history().len(), 5);
        assert_eq!(trainer.history()[4].epoch, 5);
        assert_eq!(trainer.history()[4].total_epochs, 5);

        let eval = trainer.evaluate(&data).unwrap();
        assert_eq!(trainer.state(), TrainerState::Evaluated);
        assert_eq!(eval.predictions.len(), 4);
        assert!(eval.loss.is_finite());
    }

    #[test]
    fn step_before_prepare_is_a_state_error() {
        let mut trainer = Trainer::new(sgd_config(5));
        assert!(matches!(trainer.step(&Dataset::xor()), Err(NnError::StateError(_))));
        assert!(matches!(trainer.fit(&Dataset::xor()), Err(NnError::StateError(_))));
        assert_eq!(trainer.state(), TrainerState::Uninitialized);
    }

    #[test]
    fn training_cannot_be_reentered_after_completion() {
        let data = Dataset::xor();
        let mut trainer = Trainer::new(sgd_config(2));
        trainer.prepare(network()).unwrap();
        trainer.fit(&data).unwrap();

        assert!(matches!(trainer.step(&data), Err(NnError::StateError(_))));
        assert!(matches!(trainer.fit(&data), Err(NnError::StateError(_))));
        trainer.evaluate(&data).unwrap();
        assert!(matches!(trainer.step(&data), Err(NnError::StateError(_))));
        assert!(matches!(trainer.prepare(network()), Err(NnError::StateError(_))));
        assert_eq!(trainer.history().len(), 2);
    }

    #[test]
    fn evaluate_requires_completed_training() {
        let data = Dataset::xor();
        let mut trainer = Trainer::new(sgd_config(2));
        trainer.prepare(network()).unwrap();
        assert!(matches!(trainer.evaluate(&data), Err(NnError::StateError(_))));

        trainer.step(&data).unwrap();
        assert_eq!(trainer.state(), TrainerState::Training);
        assert!(matches!(trainer.evaluate(&data), Err(NnError::StateError(_))));
    }

    #[test]
    fn stepping_to_the_epoch_count_completes_training() {
        let data = Dataset::xor();
        let mut trainer = Trainer::new(sgd_config(3));
        trainer.prepare(network()).unwrap();

        trainer.step(&data).unwrap();
        trainer.step(&data).unwrap();
        assert_eq!(trainer.state(), TrainerState::Training);
        trainer.step(&data).unwrap();
        assert_eq!(trainer.state(), TrainerState::Completed);

        assert!(matches!(trainer.step(&data), Err(NnError::StateError(_))));
        assert_eq!(trainer.history().len(), 3);
        assert_eq!(trainer.history()[2].epoch, 3);

        trainer.evaluate(&data).unwrap();
        assert_eq!(trainer.state(), TrainerState::Evaluated);
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let data = Dataset::new(vec![vec![0.0, 1.0, 1.0]], vec![vec![1.0]]).unwrap();
        let mut trainer = Trainer::new(sgd_config(2));
        trainer.prepare(network()).unwrap();
        assert!(matches!(trainer.fit(&data), Err(NnError::ShapeMismatch(_))));
        assert_eq!(trainer.state(), TrainerState::Ready);
    }

    #[test]
    fn invalid_config_fails_prepare() {
        let mut trainer = Trainer::new(sgd_config(0));
        assert!(trainer.prepare(network()).is_err());
        assert_eq!(trainer.state(), TrainerState::Uninitialized);
    }

    #[test]
    fn prepare_with_accepts_a_custom_optimizer() {
        let net = network();
        let sgd = Sgd::with_momentum(&net, 0.05, 0.5).unwrap();
        let mut trainer = Trainer::new(sgd_config(3));
        trainer.prepare_with(net, Box::new(sgd)).unwrap();
        trainer.fit(&Dataset::xor()).unwrap();
        assert_eq!(trainer.history().len(), 3);
    }
}
