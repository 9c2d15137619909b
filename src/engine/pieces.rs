//! Per-piece movement rules.
//!
//! Each predicate dispatches on the occupant of `from` with an exhaustive
//! match. None of them look at what stands on `to` beyond what the piece's
//! own rule needs (pawn captures and pushes); friendly fire is the legality
//! gate's concern. Castling never passes through here.

use crate::engine::board::Position;
use crate::engine::types::{Color, Piece, Square};

/// Does the piece on `from` move like that?
///
/// Pawn rules consult occupancy and the en-passant target because the
/// pawn's legal shape depends on them. Sliders and the knight only check
/// the displacement; blocking is `path_clear`'s job.
pub fn geometry_valid(pos: &Position, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }
    let (df, dr) = from.delta(to);
    match pos.piece_at(from) {
        Piece::Empty => false,
        Piece::Pawn(color) => pawn_geometry(pos, color, from, to),
        Piece::Knight(_) => knight_step(df, dr),
        Piece::Bishop(_) => diagonal(df, dr),
        Piece::Rook(_) => orthogonal(df, dr),
        Piece::Queen(_) => diagonal(df, dr) || orthogonal(df, dr),
        Piece::King(_) => king_step(df, dr),
    }
}

/// Is every square strictly between `from` and `to` empty?
///
/// Knights and kings jump or step, so this is vacuously true for them.
/// Callers check `geometry_valid` first; unaligned slider moves are
/// reported as clear.
pub fn path_clear(pos: &Position, from: Square, to: Square) -> bool {
    match pos.piece_at(from) {
        Piece::Empty | Piece::Knight(_) | Piece::King(_) => true,
        Piece::Pawn(_) | Piece::Bishop(_) | Piece::Rook(_) | Piece::Queen(_) => {
            from.between(to).into_iter().all(|sq| pos.is_empty(sq))
        }
    }
}

/// Does the piece on `from` attack `to`?
///
/// Same as `geometry_valid` plus `path_clear`, except a pawn attacks both
/// forward diagonals whatever stands on them.
pub fn attacks_square(pos: &Position, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }
    let (df, dr) = from.delta(to);
    match pos.piece_at(from) {
        Piece::Empty => false,
        Piece::Pawn(color) => df.abs() == 1 && dr == color.forward(),
        Piece::Knight(_) => knight_step(df, dr),
        Piece::King(_) => king_step(df, dr),
        Piece::Bishop(_) => diagonal(df, dr) && path_clear(pos, from, to),
        Piece::Rook(_) => orthogonal(df, dr) && path_clear(pos, from, to),
        Piece::Queen(_) => (diagonal(df, dr) || orthogonal(df, dr)) && path_clear(pos, from, to),
    }
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[inline]
fn knight_step(df: i8, dr: i8) -> bool {
    matches!((df.abs(), dr.abs()), (1, 2) | (2, 1))
}

#[inline]
fn king_step(df: i8, dr: i8) -> bool {
    df.abs() <= 1 && dr.abs() <= 1 && (df, dr) != (0, 0)
}

#[inline]
fn diagonal(df: i8, dr: i8) -> bool {
    df != 0 && df.abs() == dr.abs()
}

#[inline]
fn orthogonal(df: i8, dr: i8) -> bool {
    (df == 0) != (dr == 0)
}

fn pawn_geometry(pos: &Position, color: Color, from: Square, to: Square) -> bool {
    let (df, dr) = from.delta(to);
    let fwd = color.forward();

    // Pushes.
    if df == 0 {
        if dr == fwd {
            return pos.is_empty(to);
        }
        if dr == 2 * fwd && from.rank() == color.pawn_home_rank() {
            return from
                .offset(0, fwd)
                .is_some_and(|mid| pos.is_empty(mid) && pos.is_empty(to));
        }
        return false;
    }

    // Captures.
    if df.abs() != 1 || dr != fwd {
        return false;
    }
    let target = pos.piece_at(to);
    if target.is_color(!color) {
        return true;
    }
    target.is_empty()
        && from.rank() == color.en_passant_rank()
        && pos.en_passant() == Some(to)
        && to
            .offset(0, -fwd)
            .is_some_and(|behind| pos.piece_at(behind) == Piece::Pawn(!color))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
