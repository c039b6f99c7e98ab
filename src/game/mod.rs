//! Chess rules: move type, position with termination and draw rules, and
//! material counting. Legality comes from the `chess` crate.

mod chess_move;
mod position;

pub use chess::{Color, Piece};
pub use chess_move::Move;
pub use position::{Outcome, Position};
