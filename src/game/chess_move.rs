use std::fmt;

use chess::{ChessMove, Piece, Square, ALL_SQUARES};

use crate::error::RulesError;

/// A move as seen by the agent: two square indices (a1 = 0, h8 = 63) and an
/// optional promotion piece.
///
/// Squares are plain integers so the codec can reject out-of-range input
/// instead of relying on the type to make it unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub promotion: Option<Piece>,
}

impl Move {
    pub fn new(from: u8, to: u8) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: u8, to: u8, promotion: Piece) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Parse long algebraic notation such as `e2e4` or `e7e8q`.
    pub fn from_uci(uci: &str) -> Result<Self, RulesError> {
        let invalid = || RulesError::InvalidUci(uci.to_string());
        let bytes = uci.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }

        let from = parse_square(&bytes[0..2]).ok_or_else(invalid)?;
        let to = parse_square(&bytes[2..4]).ok_or_else(invalid)?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(Piece::Queen),
            Some(b'r') => Some(Piece::Rook),
            Some(b'b') => Some(Piece::Bishop),
            Some(b'n') => Some(Piece::Knight),
            Some(_) => return Err(invalid()),
        };

        Ok(Move {
            from,
            to,
            promotion,
        })
    }

    /// Convert to the rules engine's move type. `None` if either square is off the board.
    pub fn to_chess_move(&self) -> Option<ChessMove> {
        let from = square(self.from)?;
        let to = square(self.to)?;
        Some(ChessMove::new(from, to, self.promotion))
    }
}

impl From<ChessMove> for Move {
    fn from(mv: ChessMove) -> Self {
        Move {
            from: mv.get_source().to_index() as u8,
            to: mv.get_dest().to_index() as u8,
            promotion: mv.get_promotion(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_square(f, self.from)?;
        write_square(f, self.to)?;
        if let Some(piece) = self.promotion {
            let c = match piece {
                Piece::Queen => 'q',
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                Piece::Knight => 'n',
                Piece::King => 'k',
                Piece::Pawn => 'p',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Look up a square by index (a1 = 0).
pub(crate) fn square(index: u8) -> Option<Square> {
    ALL_SQUARES.get(index as usize).copied()
}

fn parse_square(bytes: &[u8]) -> Option<u8> {
    let file = bytes[0].checked_sub(b'a')?;
    let rank = bytes[1].checked_sub(b'1')?;
    if file < 8 && rank < 8 {
        Some(rank * 8 + file)
    } else {
        None
    }
}

fn write_square(f: &mut fmt::Formatter<'_>, index: u8) -> fmt::Result {
    if index >= 64 {
        return write!(f, "?{}", index);
    }
    let file = (b'a' + index % 8) as char;
    let rank = (b'1' + index / 8) as char;
    write!(f, "{}{}", file, rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uci_round_trip() {
        let mv = Move::from_uci("e2e4").unwrap();
        assert_eq!(mv, Move::new(12, 28));
        assert_eq!(mv.to_string(), "e2e4");

        let promo = Move::from_uci("a7a8n").unwrap();
        assert_eq!(promo, Move::with_promotion(48, 56, Piece::Knight));
        assert_eq!(promo.to_string(), "a7a8n");
    }

    #[test]
    fn test_uci_rejects_garbage() {
        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("i2e4").is_err());
        assert!(Move::from_uci("e2e9").is_err());
        assert!(Move::from_uci("e7e8x").is_err());
    }

    #[test]
    fn test_chess_move_conversion() {
        let mv = Move::with_promotion(52, 60, Piece::Queen);
        let cm = mv.to_chess_move().unwrap();
        assert_eq!(Move::from(cm), mv);
    }

    #[test]
    fn test_off_board_square_has_no_chess_move() {
        assert!(Move::new(64, 0).to_chess_move().is_none());
        assert!(Move::new(0, 200).to_chess_move().is_none());
    }
}
