use std::ops::ControlFlow;

use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::Agent;
use crate::environment::ChessEnv;
use crate::game::{Color, Move, Position};
use crate::training::game_record::GameRecorder;
use crate::training::metrics::EpisodeResult;

/// Whose point of view the environment reward is credited from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPerspective {
    /// Both agents receive the raw White-perspective reward.
    ///
    /// Black's agent therefore learns to maximise White's advantage, against
    /// its own interest.
    #[default]
    White,
    /// Black's rewards are negated so each agent sees its own advantage.
    SideToMove,
}

impl RewardPerspective {
    pub fn credit(self, mover: Color, reward: f32) -> f32 {
        match (self, mover) {
            (RewardPerspective::SideToMove, Color::Black) => -reward,
            _ => reward,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EpisodeOptions {
    /// End the game as a draw after this many plies.
    pub max_plies: Option<usize>,
    pub perspective: RewardPerspective,
}

/// Play one game between `white` and `black`, crediting each ply's reward
/// to the agent that made it.
pub fn play_episode(
    env: &mut ChessEnv,
    white: &mut dyn Agent,
    black: &mut dyn Agent,
    rng: &mut StdRng,
    options: &EpisodeOptions,
    recorder: Option<&mut GameRecorder>,
) -> EpisodeResult {
    play_episode_observed(env, white, black, rng, options, recorder, |_, _| {
        ControlFlow::Continue(())
    })
}

/// Like [`play_episode`], calling `observe` after every ply with the move
/// played and the resulting position. Returning `Break` stops the game.
pub fn play_episode_observed<F>(
    env: &mut ChessEnv,
    white: &mut dyn Agent,
    black: &mut dyn Agent,
    rng: &mut StdRng,
    options: &EpisodeOptions,
    mut recorder: Option<&mut GameRecorder>,
    mut observe: F,
) -> EpisodeResult
where
    F: FnMut(&Move, &Position) -> ControlFlow<()>,
{
    let mut state = env.reset();
    if let Some(r) = recorder.as_deref_mut() {
        r.start_game();
    }
    let mut plies = 0;
    let mut fallbacks = 0;

    loop {
        if options.max_plies.is_some_and(|cap| plies >= cap) {
            log::debug!("stopping game at the {plies}-ply cap");
            break;
        }
        let legal = env.legal_moves();
        if legal.is_empty() {
            break;
        }

        let mover = env.position().side_to_move();
        let agent: &mut dyn Agent = match mover {
            Color::White => &mut *white,
            Color::Black => &mut *black,
        };

        let mut mv = agent.select_action(&state, &legal);
        if !env.position().is_legal(&mv) {
            fallbacks += 1;
            let substitute = legal[rng.random_range(0..legal.len())];
            log::debug!(
                "{} chose illegal move {mv}, playing {substitute} instead",
                agent.name()
            );
            mv = substitute;
        }

        let step = env.step(&mv);
        agent.record_reward(options.perspective.credit(mover, step.reward));
        if let Some(r) = recorder.as_deref_mut() {
            r.log_move(&mv, env.position());
        }
        state = step.state;
        plies += 1;

        if step.done || observe(&mv, env.position()).is_break() {
            break;
        }
    }

    let outcome = env.position().outcome();
    let winner = outcome.and_then(|o| o.winner());
    if let Some(r) = recorder {
        r.end_game(winner);
    }

    EpisodeResult {
        winner,
        outcome,
        game_length: plies,
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;

    use super::*;
    use crate::ai::state_encoding::EncodedState;
    use crate::ai::RandomAgent;
    use crate::game::Outcome;

    /// Plays a fixed list of moves and remembers its rewards.
    struct ScriptedAgent {
        moves: VecDeque<Move>,
        rewards: Vec<f32>,
    }

    impl ScriptedAgent {
        fn new(moves: &[&str]) -> Self {
            ScriptedAgent {
                moves: moves.iter().map(|m| Move::from_uci(m).unwrap()).collect(),
                rewards: Vec::new(),
            }
        }
    }

    impl Agent for ScriptedAgent {
        fn select_action(&mut self, _state: &EncodedState, _legal: &[Move]) -> Move {
            self.moves.pop_front().unwrap()
        }

        fn name(&self) -> &str {
            "Scripted"
        }

        fn record_reward(&mut self, reward: f32) {
            self.rewards.push(reward);
        }
    }

    fn fools_mate(perspective: RewardPerspective) -> (EpisodeResult, ScriptedAgent, ScriptedAgent) {
        let mut white = ScriptedAgent::new(&["f2f3", "g2g4"]);
        let mut black = ScriptedAgent::new(&["e7e5", "d8h4"]);
        let options = EpisodeOptions {
            perspective,
            ..Default::default()
        };
        let result = play_episode(
            &mut ChessEnv::new(),
            &mut white,
            &mut black,
            &mut StdRng::seed_from_u64(0),
            &options,
            None,
        );
        (result, white, black)
    }

    #[test]
    fn test_scripted_game_result() {
        let (result, white, black) = fools_mate(RewardPerspective::White);
        assert_eq!(result.game_length, 4);
        assert_eq!(result.winner, Some(Color::Black));
        assert_eq!(
            result.outcome,
            Some(Outcome::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(result.fallbacks, 0);
        assert_eq!(white.rewards, vec![0.0, 0.0]);
        assert_eq!(black.rewards, vec![0.0, -1.0]);
    }

    #[test]
    fn test_side_to_move_perspective_negates_black() {
        let (_, white, black) = fools_mate(RewardPerspective::SideToMove);
        assert_eq!(white.rewards, vec![0.0, 0.0]);
        assert_eq!(black.rewards, vec![-0.0, 1.0]);
    }

    #[test]
    fn test_default_perspective_credits_black_with_white_reward() {
        let perspective = RewardPerspective::default();
        assert_eq!(perspective, RewardPerspective::White);
        assert_eq!(perspective.credit(Color::White, 0.5), 0.5);
        assert_eq!(perspective.credit(Color::Black, 0.5), 0.5);
        assert_eq!(RewardPerspective::SideToMove.credit(Color::Black, 0.5), -0.5);
    }

    #[test]
    fn test_illegal_choice_falls_back_to_legal_move() {
        // Every scripted move is illegal in the position it is offered in.
        let mut white = ScriptedAgent::new(&["e2e5", "e2e5"]);
        let mut black = RandomAgent::with_seed(3);
        let options = EpisodeOptions {
            max_plies: Some(3),
            ..Default::default()
        };
        let mut env = ChessEnv::new();
        let mut recorder = GameRecorder::new();
        let result = play_episode(
            &mut env,
            &mut white,
            &mut black,
            &mut StdRng::seed_from_u64(9),
            &options,
            Some(&mut recorder),
        );

        assert_eq!(result.fallbacks, 2);
        assert_eq!(result.game_length, 3);
        assert_eq!(white.rewards.len(), 2);
        assert!(white.rewards.iter().all(|&r| r > -1.0));
        assert_eq!(recorder.current().total_moves, 3);
    }

    #[test]
    fn test_ply_cap_ends_game_as_draw() {
        let mut white = RandomAgent::with_seed(1);
        let mut black = RandomAgent::with_seed(2);
        let options = EpisodeOptions {
            max_plies: Some(3),
            ..Default::default()
        };
        let result = play_episode(
            &mut ChessEnv::new(),
            &mut white,
            &mut black,
            &mut StdRng::seed_from_u64(0),
            &options,
            None,
        );
        assert_eq!(result.game_length, 3);
        assert_eq!(result.winner, None);
        assert_eq!(result.outcome, None);
    }

    #[test]
    fn test_random_game_runs_to_completion() {
        let mut white = RandomAgent::with_seed(4);
        let mut black = RandomAgent::with_seed(5);
        let mut env = ChessEnv::new();
        let result = play_episode(
            &mut env,
            &mut white,
            &mut black,
            &mut StdRng::seed_from_u64(0),
            &EpisodeOptions::default(),
            None,
        );
        assert!(result.game_length > 0);
        assert!(env.is_game_over());
        assert_eq!(result.outcome, env.position().outcome());
    }

    #[test]
    fn test_observer_can_stop_the_game() {
        let mut white = RandomAgent::with_seed(6);
        let mut black = RandomAgent::with_seed(7);
        let mut seen = 0;
        let result = play_episode_observed(
            &mut ChessEnv::new(),
            &mut white,
            &mut black,
            &mut StdRng::seed_from_u64(0),
            &EpisodeOptions::default(),
            None,
            |_, _| {
                seen += 1;
                if seen == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        assert_eq!(seen, 2);
        assert_eq!(result.game_length, 2);
    }
}
