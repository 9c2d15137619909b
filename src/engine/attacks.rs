//! Attack queries over the current occupancy.
//!
//! Every piece of the attacking side is asked, through the piece catalog's
//! attack geometry, whether it reaches the target. The king answers with its
//! own one-step shape so the query never recurses into check analysis.

use crate::engine::board::Position;
use crate::engine::pieces;
use crate::engine::types::{Color, Square};

/// Does any piece of `by` attack `target`?
pub fn attacks(pos: &Position, by: Color, target: Square) -> bool {
    pos.squares_of(by)
        .any(|from| pieces::attacks_square(pos, from, target))
}

/// Squares of every `by` piece attacking `target`.
pub fn attackers(pos: &Position, by: Color, target: Square) -> Vec<Square> {
    pos.squares_of(by)
        .filter(|&from| pieces::attacks_square(pos, from, target))
        .collect()
}

/// Is `color`'s king attacked right now?
#[inline]
pub fn king_attacked(pos: &Position, color: Color) -> bool {
    attacks(pos, !color, pos.king_square(color))
}
