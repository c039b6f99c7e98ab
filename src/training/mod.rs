//! Self-play driver, trainer, rolling metrics and per-game records.

pub mod episode;
pub mod game_record;
pub mod metrics;
pub mod trainer;

pub use episode::{play_episode, play_episode_observed, EpisodeOptions, RewardPerspective};
pub use game_record::{GameRecord, GameRecorder, MoveRecord, Side};
pub use metrics::{EpisodeResult, TrainingMetrics};
pub use trainer::{Trainer, TrainerConfig, TrainingSummary};
