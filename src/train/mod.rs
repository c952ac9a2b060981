pub mod epoch_stats;
pub mod restarts;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::EpochStats;
pub use restarts::{train_until_solved, StalledAttempt, TrainedRun};
pub use train_config::TrainConfig;
pub use trainer::{Evaluation, SamplePrediction, Trainer, TrainerState};
