use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{Color, Move, Position};

/// Side that won a recorded game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// One ply and the position it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// UCI notation.
    pub uci: String,
    pub timestamp: DateTime<Utc>,
    pub fen: String,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_insufficient_material: bool,
    pub is_game_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub moves: Vec<MoveRecord>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// `None` for a draw or an unfinished game.
    pub winner: Option<Side>,
    pub total_moves: usize,
    pub duration_ms: Option<i64>,
}

/// Tracks the moves of the game in progress.
#[derive(Debug, Default)]
pub struct GameRecorder {
    current: GameRecord,
}

impl GameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current record and start a fresh one.
    pub fn start_game(&mut self) {
        self.current = GameRecord {
            start_time: Some(Utc::now()),
            ..Default::default()
        };
    }

    /// Record a move together with the position it led to.
    pub fn log_move(&mut self, mv: &Move, position: &Position) {
        self.current.moves.push(MoveRecord {
            uci: mv.to_string(),
            timestamp: Utc::now(),
            fen: position.fen(),
            is_check: position.is_check(),
            is_checkmate: position.is_checkmate(),
            is_stalemate: position.is_stalemate(),
            is_insufficient_material: position.is_insufficient_material(),
            is_game_over: position.is_game_over(),
        });
        self.current.total_moves = self.current.moves.len();
    }

    pub fn end_game(&mut self, winner: Option<Color>) {
        let end = Utc::now();
        self.current.end_time = Some(end);
        self.current.winner = winner.map(Side::from);
        self.current.duration_ms = self
            .current
            .start_time
            .map(|start| (end - start).num_milliseconds());
    }

    pub fn current(&self) -> &GameRecord {
        &self.current
    }

    /// Moves played so far, in UCI notation.
    pub fn move_history(&self) -> Vec<String> {
        self.current.moves.iter().map(|m| m.uci.clone()).collect()
    }

    /// Write the current record as pretty JSON into `dir`, returning the file path.
    pub fn save(&self, dir: &Path, game_index: usize) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("game_{game_index:06}.json"));
        let json = serde_json::to_string_pretty(&self.current)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
