//! Gym-style wrapper around a [`Position`]: reset, step, reward.

use crate::ai::state_encoding::{encode_position, EncodedState};
use crate::game::{Color, Move, Outcome, Position};

/// Reward credited to an illegal move, which also ends the episode.
pub const ILLEGAL_MOVE_REWARD: f32 = -1.0;
/// Material difference is divided by this before being used as a reward.
pub const MATERIAL_SCALE: f32 = 100.0;

/// Diagnostics describing the position after a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub fen: String,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_insufficient_material: bool,
    pub legal_moves: Vec<Move>,
    /// The submitted move was rejected; the position is unchanged.
    pub illegal: bool,
}

impl StepInfo {
    fn describe(position: &Position, illegal: bool) -> Self {
        StepInfo {
            fen: position.fen(),
            is_check: position.is_check(),
            is_checkmate: position.is_checkmate(),
            is_stalemate: position.is_stalemate(),
            is_insufficient_material: position.is_insufficient_material(),
            legal_moves: position.legal_moves(),
            illegal,
        }
    }
}

/// Result of [`ChessEnv::step`].
#[derive(Debug, Clone)]
pub struct Step {
    pub state: EncodedState,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

/// A single chess game, rewarded from White's point of view.
#[derive(Debug, Clone, Default)]
pub struct ChessEnv {
    position: Position,
}

impl ChessEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an environment from an arbitrary position.
    pub fn from_position(position: Position) -> Self {
        ChessEnv { position }
    }

    /// Return to the starting position and its encoding.
    pub fn reset(&mut self) -> EncodedState {
        self.position = Position::initial();
        self.state()
    }

    pub fn state(&self) -> EncodedState {
        encode_position(&self.position)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// Apply a move.
    ///
    /// An illegal move is not an error: it scores -1.0 and ends the episode
    /// without changing the position.
    pub fn step(&mut self, mv: &Move) -> Step {
        match self.position.push(mv) {
            Ok(next) => {
                self.position = next;
                Step {
                    state: self.state(),
                    reward: reward(&self.position),
                    done: self.position.is_game_over(),
                    info: StepInfo::describe(&self.position, false),
                }
            }
            Err(e) => {
                log::debug!("{e}");
                Step {
                    state: self.state(),
                    reward: ILLEGAL_MOVE_REWARD,
                    done: true,
                    info: StepInfo::describe(&self.position, true),
                }
            }
        }
    }
}

/// White-perspective reward for a position.
///
/// Checkmate scores +1.0 when White delivered it and -1.0 when Black did;
/// any other finished game scores 0.0. Otherwise the material difference
/// (White minus Black) divided by [`MATERIAL_SCALE`].
pub fn reward(position: &Position) -> f32 {
    match position.outcome() {
        Some(Outcome::Checkmate { winner: Color::White }) => 1.0,
        Some(Outcome::Checkmate { winner: Color::Black }) => -1.0,
        Some(_) => 0.0,
        None => {
            let white = position.material_value(Color::White) as f32;
            let black = position.material_value(Color::Black) as f32;
            (white - black) / MATERIAL_SCALE
        }
    }
}
