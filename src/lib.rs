pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{Layer, LayerGradients};
pub use network::network::Network;
pub use network::spec::{LayerSpec, xor_architecture};
pub use loss::bce::BceLoss;
pub use optim::{Adam, Optimizer, OptimizerKind, Sgd};
pub use data::dataset::Dataset;
pub use train::{
    train_until_solved, EpochStats, Evaluation, SamplePrediction, StalledAttempt, TrainConfig,
    TrainedRun, Trainer, TrainerState,
};
