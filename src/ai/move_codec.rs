//! Bijection between chess moves and a flat action index.
//!
//! ```text
//! index = from * 320 + to * 5 + promo_rank
//! promo_rank: none = 0, queen = 1, rook = 2, bishop = 3, knight = 4
//! ```

use crate::error::CodecError;
use crate::game::{Move, Piece};

pub type ActionIndex = usize;

const SQUARES: usize = 64;
const PROMOTIONS: usize = 5;

/// Number of distinct action indices: 64 * 64 * 5.
pub const ACTION_SPACE: usize = SQUARES * SQUARES * PROMOTIONS;

/// Map a move to its action index.
pub fn encode(mv: &Move) -> Result<ActionIndex, CodecError> {
    let from = check_square(mv.from)?;
    let to = check_square(mv.to)?;
    let promo = promo_rank(mv.promotion)?;
    Ok(from * SQUARES * PROMOTIONS + to * PROMOTIONS + promo)
}

/// Map an action index back to its move.
pub fn decode(index: ActionIndex) -> Result<Move, CodecError> {
    if index >= ACTION_SPACE {
        return Err(CodecError::IndexOutOfRange(index));
    }
    let promotion = match index % PROMOTIONS {
        0 => None,
        1 => Some(Piece::Queen),
        2 => Some(Piece::Rook),
        3 => Some(Piece::Bishop),
        _ => Some(Piece::Knight),
    };
    let rest = index / PROMOTIONS;
    Ok(Move {
        from: (rest / SQUARES) as u8,
        to: (rest % SQUARES) as u8,
        promotion,
    })
}

fn check_square(square: u8) -> Result<usize, CodecError> {
    if (square as usize) < SQUARES {
        Ok(square as usize)
    } else {
        Err(CodecError::SquareOutOfRange(square))
    }
}

fn promo_rank(promotion: Option<Piece>) -> Result<usize, CodecError> {
    match promotion {
        None => Ok(0),
        Some(Piece::Queen) => Ok(1),
        Some(Piece::Rook) => Ok(2),
        Some(Piece::Bishop) => Ok(3),
        Some(Piece::Knight) => Ok(4),
        Some(piece) => Err(CodecError::InvalidPromotion(piece)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    const PROMOS: [Option<Piece>; 5] = [
        None,
        Some(Piece::Queen),
        Some(Piece::Rook),
        Some(Piece::Bishop),
        Some(Piece::Knight),
    ];

    #[test]
    fn test_action_space_size() {
        assert_eq!(ACTION_SPACE, 20480);
    }

    #[test]
    fn test_known_indices() {
        assert_eq!(encode(&Move::new(0, 0)).unwrap(), 0);
        // e2e4: 12 * 320 + 28 * 5
        assert_eq!(encode(&Move::new(12, 28)).unwrap(), 3980);
        // e7e8=N: 52 * 320 + 60 * 5 + 4
        assert_eq!(
            encode(&Move::with_promotion(52, 60, Piece::Knight)).unwrap(),
            16944
        );
        assert_eq!(
            encode(&Move::with_promotion(63, 63, Piece::Knight)).unwrap(),
            ACTION_SPACE - 1
        );
    }

    #[test]
    fn test_every_move_round_trips() {
        for from in 0..64u8 {
            for to in 0..64u8 {
                for promotion in PROMOS {
                    let mv = Move {
                        from,
                        to,
                        promotion,
                    };
                    let index = encode(&mv).unwrap();
                    assert!(index < ACTION_SPACE);
                    assert_eq!(decode(index).unwrap(), mv);
                }
            }
        }
    }

    #[test]
    fn test_every_index_round_trips() {
        for index in 0..ACTION_SPACE {
            assert_eq!(encode(&decode(index).unwrap()).unwrap(), index);
        }
    }

    #[test]
    fn test_invalid_promotion_is_rejected() {
        let king = Move::with_promotion(52, 60, Piece::King);
        assert_eq!(encode(&king), Err(CodecError::InvalidPromotion(Piece::King)));
        let pawn = Move::with_promotion(52, 60, Piece::Pawn);
        assert_eq!(encode(&pawn), Err(CodecError::InvalidPromotion(Piece::Pawn)));
    }

    #[test]
    fn test_out_of_range_input_is_rejected() {
        assert_eq!(
            encode(&Move::new(64, 0)),
            Err(CodecError::SquareOutOfRange(64))
        );
        assert_eq!(
            encode(&Move::new(0, 255)),
            Err(CodecError::SquareOutOfRange(255))
        );
        assert_eq!(
            decode(ACTION_SPACE),
            Err(CodecError::IndexOutOfRange(ACTION_SPACE))
        );
    }

    #[test]
    fn test_legal_moves_have_distinct_indices() {
        let moves = Position::initial().legal_moves();
        let mut indices: Vec<usize> = moves.iter().map(|m| encode(m).unwrap()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), moves.len());
    }
}
