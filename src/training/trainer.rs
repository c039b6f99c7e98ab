use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::{Agent, UpdateMetrics};
use crate::environment::ChessEnv;
use crate::game::Color;
use crate::training::episode::{play_episode, EpisodeOptions, RewardPerspective};
use crate::training::game_record::GameRecorder;
use crate::training::metrics::TrainingMetrics;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    /// Cap on game length; longer games are scored as draws.
    pub max_plies: Option<usize>,
    pub reward_perspective: RewardPerspective,
    /// Write one JSON record per game into this directory.
    pub game_log_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 100,
            log_interval: 10,
            max_plies: None,
            reward_perspective: RewardPerspective::White,
            game_log_dir: None,
            seed: None,
        }
    }
}

/// Totals reported at the end of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub total_plies: usize,
    pub fallbacks: usize,
    /// Episodes whose update was skipped because it failed.
    pub failed_updates: usize,
}

/// Self-play trainer: two agents, one per colour, each updated after every game.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the full training loop.
    pub fn train(&self, white: &mut dyn Agent, black: &mut dyn Agent) -> TrainingSummary {
        let mut env = ChessEnv::new();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut recorder = self.config.game_log_dir.as_ref().map(|_| GameRecorder::new());
        let options = EpisodeOptions {
            max_plies: self.config.max_plies,
            perspective: self.config.reward_perspective,
        };
        let mut metrics = TrainingMetrics::new();
        let mut summary = TrainingSummary {
            episodes: 0,
            white_wins: 0,
            black_wins: 0,
            draws: 0,
            total_plies: 0,
            fallbacks: 0,
            failed_updates: 0,
        };

        log::info!(
            "Training {} vs {} for {} episodes",
            white.name(),
            black.name(),
            self.config.num_episodes
        );

        for episode in 1..=self.config.num_episodes {
            let result = play_episode(
                &mut env,
                white,
                black,
                &mut rng,
                &options,
                recorder.as_mut(),
            );

            let agents: [(&str, &mut dyn Agent); 2] =
                [("white", &mut *white), ("black", &mut *black)];
            for (side, agent) in agents {
                match agent.finish_episode() {
                    Ok(update) => record_update(&mut metrics, &update),
                    Err(e) => {
                        summary.failed_updates += 1;
                        log::warn!("episode {episode}: {side} update skipped: {e}");
                    }
                }
            }

            if let (Some(dir), Some(rec)) = (&self.config.game_log_dir, &recorder) {
                if let Err(e) = rec.save(dir, episode) {
                    log::warn!("could not write game record to {}: {e}", dir.display());
                }
            }

            match result.winner {
                Some(Color::White) => summary.white_wins += 1,
                Some(Color::Black) => summary.black_wins += 1,
                None => summary.draws += 1,
            }
            summary.episodes += 1;
            summary.total_plies += result.game_length;
            summary.fallbacks += result.fallbacks;
            metrics.record_episode(result);

            if self.config.log_interval > 0 && episode % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                log::info!(
                    "Episode {}/{} | loss: {:.4} | white({}): {:.1}% | black: {:.1}% | draw: {:.1}% | avg_len: {:.1}",
                    episode,
                    self.config.num_episodes,
                    metrics.average_loss(window * 2),
                    window,
                    metrics.win_rate(Color::White, window) * 100.0,
                    metrics.win_rate(Color::Black, window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.average_game_length(window),
                );
            }
        }

        log::info!(
            "Training complete: {} episodes, {} white wins, {} black wins, {} draws, {} fallback moves",
            summary.episodes,
            summary.white_wins,
            summary.black_wins,
            summary.draws,
            summary.fallbacks
        );
        summary
    }
}

fn record_update(metrics: &mut TrainingMetrics, update: &UpdateMetrics) {
    // Non-learning agents report an all-zero update.
    if update.steps > 0 {
        metrics.record_update(update.loss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ActorCriticAgent, AgentConfig, RandomAgent};

    fn short_config(num_episodes: usize) -> TrainerConfig {
        TrainerConfig {
            num_episodes,
            log_interval: 1,
            max_plies: Some(12),
            seed: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_counts_every_episode() {
        let trainer = Trainer::new(short_config(3));
        let mut white = RandomAgent::with_seed(1);
        let mut black = RandomAgent::with_seed(2);
        let summary = trainer.train(&mut white, &mut black);

        assert_eq!(summary.episodes, 3);
        assert_eq!(summary.white_wins + summary.black_wins + summary.draws, 3);
        assert!(summary.total_plies > 0 && summary.total_plies <= 36);
        assert_eq!(summary.fallbacks, 0);
        assert_eq!(summary.failed_updates, 0);
    }

    #[test]
    fn test_learning_agents_are_updated_and_cleared() {
        let config = || AgentConfig {
            hidden_size: 16,
            seed: Some(5),
            ..Default::default()
        };
        let mut white = ActorCriticAgent::new(config());
        let mut black = ActorCriticAgent::new(config());
        let trainer = Trainer::new(short_config(2));
        let summary = trainer.train(&mut white, &mut black);

        assert_eq!(summary.failed_updates, 0);
        assert_eq!(white.episode_count(), 2);
        assert_eq!(black.episode_count(), 2);
        assert_eq!(white.buffer_len(), (0, 0, 0));
        assert_eq!(black.buffer_len(), (0, 0, 0));
    }

    #[test]
    fn test_game_records_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(TrainerConfig {
            game_log_dir: Some(dir.path().to_path_buf()),
            ..short_config(2)
        });
        trainer.train(&mut RandomAgent::with_seed(3), &mut RandomAgent::with_seed(4));

        assert!(dir.path().join("game_000001.json").exists());
        assert!(dir.path().join("game_000002.json").exists());
    }
}
