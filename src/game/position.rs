use std::str::FromStr;

use chess::{Board, BoardStatus, Color, MoveGen, Piece, ALL_SQUARES};

use super::chess_move::{square, Move};
use crate::error::RulesError;

/// Half-moves without a capture or pawn move after which the game is drawn.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
const FIVEFOLD: usize = 5;
const DARK_SQUARES: u64 = 0xAA55_AA55_AA55_AA55;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl Outcome {
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

/// A chess position plus the bookkeeping the draw rules need.
///
/// Transitions are immutable: `push` returns a new position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    // Hashes since the last irreversible move, current position last.
    history: Vec<u64>,
}

impl Position {
    /// The standard starting position.
    pub fn initial() -> Self {
        Self::from_board(Board::default())
    }

    /// Parse a FEN string. The half-move clock (fifth field) is kept for the
    /// seventy-five-move rule; it defaults to 0 when the field is absent.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let invalid = || RulesError::InvalidFen(fen.to_string());
        let board = Board::from_str(fen).map_err(|_| invalid())?;
        let halfmove_clock = match fen.split_whitespace().nth(4) {
            Some(field) => field.parse().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Position {
            halfmove_clock,
            ..Self::from_board(board)
        })
    }

    fn from_board(board: Board) -> Self {
        Position {
            history: vec![board.get_hash()],
            board,
            halfmove_clock: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Piece and colour on a square index (a1 = 0), if any.
    pub fn piece_at(&self, index: u8) -> Option<(Piece, Color)> {
        let sq = square(index)?;
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece, color))
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        MoveGen::new_legal(&self.board).map(Move::from).collect()
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        match mv.to_chess_move() {
            Some(cm) => !self.is_game_over() && self.board.legal(cm),
            None => false,
        }
    }

    /// Play a move, returning the resulting position.
    pub fn push(&self, mv: &Move) -> Result<Position, RulesError> {
        let cm = mv
            .to_chess_move()
            .filter(|_| !self.is_game_over())
            .filter(|cm| self.board.legal(*cm))
            .ok_or_else(|| RulesError::IllegalMove(mv.to_string()))?;

        let irreversible = self.board.piece_on(cm.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(cm.get_dest()).is_some();
        let board = self.board.make_move_new(cm);

        let (halfmove_clock, mut history) = if irreversible {
            (0, Vec::new())
        } else {
            (self.halfmove_clock + 1, self.history.clone())
        };
        history.push(board.get_hash());

        Ok(Position {
            board,
            halfmove_clock,
            history,
        })
    }

    pub fn is_check(&self) -> bool {
        self.board.checkers().0 != 0
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    /// Neither side can possibly deliver mate.
    pub fn is_insufficient_material(&self) -> bool {
        self.has_insufficient_material(Color::White)
            && self.has_insufficient_material(Color::Black)
    }

    fn has_insufficient_material(&self, color: Color) -> bool {
        let b = &self.board;
        let ours = b.color_combined(color).0;
        let theirs = b.color_combined(opponent(color)).0;
        let pieces = |p: Piece| b.pieces(p).0;

        if ours & (pieces(Piece::Pawn) | pieces(Piece::Rook) | pieces(Piece::Queen)) != 0 {
            return false;
        }
        if ours & pieces(Piece::Knight) != 0 {
            // A lone knight can only mate with help from the opponent's own pieces.
            return ours.count_ones() <= 2
                && theirs & !pieces(Piece::King) & !pieces(Piece::Queen) == 0;
        }
        if ours & pieces(Piece::Bishop) != 0 {
            let bishops = pieces(Piece::Bishop);
            let same_color = bishops & DARK_SQUARES == 0 || bishops & !DARK_SQUARES == 0;
            return same_color && pieces(Piece::Pawn) == 0 && pieces(Piece::Knight) == 0;
        }
        true
    }

    pub fn is_seventyfive_moves(&self) -> bool {
        self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES && !self.is_checkmate()
    }

    pub fn is_fivefold_repetition(&self) -> bool {
        let current = self.board.get_hash();
        self.history.iter().filter(|&&h| h == current).count() >= FIVEFOLD
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Checkmate => {
                return Some(Outcome::Checkmate {
                    winner: opponent(self.side_to_move()),
                })
            }
            BoardStatus::Stalemate => return Some(Outcome::Stalemate),
            BoardStatus::Ongoing => {}
        }
        if self.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.is_seventyfive_moves() {
            Some(Outcome::SeventyFiveMoves)
        } else if self.is_fivefold_repetition() {
            Some(Outcome::FivefoldRepetition)
        } else {
            None
        }
    }

    /// Material count for one side: P=1, N=3, B=3, R=5, Q=9, K=0.
    pub fn material_value(&self, color: Color) -> u32 {
        let ours = self.board.color_combined(color).0;
        [
            (Piece::Pawn, 1),
            (Piece::Knight, 3),
            (Piece::Bishop, 3),
            (Piece::Rook, 5),
            (Piece::Queen, 9),
        ]
        .iter()
        .map(|&(piece, value)| (self.board.pieces(piece).0 & ours).count_ones() * value)
        .sum()
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// Board diagram, rank 8 first, `.` for empty squares.
    pub fn to_portable_notation(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in (0..8u8).rev() {
            let row: Vec<String> = (0..8u8)
                .map(|file| {
                    let sq = ALL_SQUARES[(rank * 8 + file) as usize];
                    match (self.board.piece_on(sq), self.board.color_on(sq)) {
                        (Some(piece), Some(color)) => piece.to_string(color),
                        _ => ".".to_string(),
                    }
                })
                .collect();
            rows.push(row.join(" "));
        }
        rows.join("\n")
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

fn opponent(color: Color) -> Color {
    match color {
        Color::White => Color::Black,
        Color::Black => Color::White,
    }
}
