//! Castling recognition and validation.
//!
//! A request is a castle when the king leaves its home square two files
//! sideways, toward the g-file (kingside) or the c-file (queenside). The
//! relocation itself is `Position::castle`; this module only decides whether
//! it may happen.

use tracing::debug;

use crate::engine::attacks;
use crate::engine::board::{CastleSquares, Position, home_king_square};
use crate::engine::types::{CastleError, CastleSide, Color, Piece, Square};

/// Which castle, if any, a king move from `from` to `to` requests.
pub fn castle_side(pos: &Position, from: Square, to: Square) -> Option<CastleSide> {
    let Piece::King(color) = pos.piece_at(from) else {
        return None;
    };
    if from != home_king_square(color) || to.rank() != from.rank() {
        return None;
    }
    match from.delta(to).0 {
        2 => Some(CastleSide::Kingside),
        -2 => Some(CastleSide::Queenside),
        _ => None,
    }
}

/// Check every castling condition for `color` on `side`.
///
/// Conditions are tested in order: rights, turn, king on its home square,
/// rook on its corner, empty squares between them, then attacks on the
/// king's origin, transit and destination squares.
pub fn validate(pos: &Position, color: Color, side: CastleSide) -> Result<(), CastleError> {
    let rights = pos.castling_rights();
    if !rights.can_castle(color, side) {
        return Err(CastleError::RightsLost { color, side });
    }
    if pos.side_to_move() != color {
        return Err(CastleError::NotYourTurn(color));
    }

    let squares = CastleSquares::of(color, side);
    if pos.piece_at(squares.king_from) != Piece::King(color) {
        return Err(CastleError::KingNotHome);
    }
    if pos.piece_at(squares.rook_from) != Piece::Rook(color) {
        return Err(CastleError::RookMissing(squares.rook_from));
    }
    if let Some(blocked) = squares
        .king_from
        .between(squares.rook_from)
        .into_iter()
        .find(|&sq| !pos.is_empty(sq))
    {
        return Err(CastleError::PathBlocked(blocked));
    }

    let transit = squares.rook_to;
    for sq in [squares.king_from, transit, squares.king_to] {
        if attacks::attacks(pos, !color, sq) {
            debug!(%color, %side, square = %sq, "castling square attacked");
            return Err(CastleError::SquareAttacked(sq));
        }
    }
    Ok(())
}
