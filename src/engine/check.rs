//! Check and checkmate analysis.
//!
//! Runs after every committed move against the side that must reply. A king
//! under attack is checkmated when no friendly piece can take or block the
//! checker and none of its eight neighbours is a safe landing square.
//!
//! Neighbour safety is judged with the king still standing on its origin,
//! so a square behind the king on the checking line can look safe. That
//! approximation is deliberate and kept as-is.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::pieces;
use crate::engine::types::{Color, Piece, PieceType, Square};

// ---------------------------------------------------------------------------
// Per-side state
// ---------------------------------------------------------------------------

/// Check status of one side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KingStatus {
    #[default]
    None,
    InCheck,
    Checkmated,
}

/// Check status of both sides, indexed by colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckState {
    sides: [KingStatus; 2],
}

impl CheckState {
    pub fn status(&self, color: Color) -> KingStatus {
        self.sides[color.index()]
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.status(color) != KingStatus::None
    }

    pub fn is_checkmated(&self, color: Color) -> bool {
        self.status(color) == KingStatus::Checkmated
    }

    /// The side that delivered mate, once there is one.
    pub fn winner(&self) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|&c| self.is_checkmated(c))
            .map(|loser| !loser)
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    /// Update after `mover` completed a legal move in `pos`: the mover is out
    /// of check by construction and the opponent is re-analysed.
    pub fn record_move(&mut self, pos: &Position, mover: Color) -> KingStatus {
        self.sides[mover.index()] = KingStatus::None;
        let reply = analyze(pos, !mover);
        self.sides[(!mover).index()] = reply;
        reply
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Status of `defender`'s king in `pos`. Pure: the same position always
/// yields the same answer.
pub fn analyze(pos: &Position, defender: Color) -> KingStatus {
    if !is_in_check(pos, defender) {
        return KingStatus::None;
    }
    if can_capture_or_interpose(pos, defender) || !escape_squares(pos, defender).is_empty() {
        KingStatus::InCheck
    } else {
        KingStatus::Checkmated
    }
}

pub fn is_in_check(pos: &Position, color: Color) -> bool {
    attacks::king_attacked(pos, color)
}

/// Can some non-king piece of `defender` take the checker or step between
/// it and the king without exposing the king?
///
/// A double check cannot be answered this way and yields `false`.
pub fn can_capture_or_interpose(pos: &Position, defender: Color) -> bool {
    let king = pos.king_square(defender);
    let checkers = attacks::attackers(pos, !defender, king);
    let [checker] = checkers.as_slice() else {
        return false;
    };

    let mut targets = vec![*checker];
    if matches!(
        pos.piece_at(*checker),
        Piece::Rook(_) | Piece::Bishop(_) | Piece::Queen(_)
    ) {
        targets.extend(checker.between(king));
    }
    // A pawn that just advanced two squares can also be taken en passant.
    if matches!(pos.piece_at(*checker), Piece::Pawn(_))
        && let Some(ep) = pos.en_passant()
        && checker.offset(0, defender.forward()) == Some(ep)
    {
        targets.push(ep);
    }

    let mut scratch = pos.clone();
    let defenders: Vec<Square> = pos
        .squares_of(defender)
        .filter(|&sq| !matches!(pos.piece_at(sq), Piece::King(_)))
        .collect();

    defenders.into_iter().any(|from| {
        targets.iter().any(|&to| {
            if !pieces::geometry_valid(&scratch, from, to)
                || !pieces::path_clear(&scratch, from, to)
                || scratch.piece_at(to).is_color(defender)
            {
                return false;
            }
            let mut txn = scratch.begin();
            txn.apply_move(from, to, PieceType::Queen);
            !attacks::king_attacked(&txn, defender)
        })
    })
}

/// Neighbours of `color`'s king that are on the board, not held by a friend
/// and not attacked by the enemy with the king still on its origin.
pub fn escape_squares(pos: &Position, color: Color) -> Vec<Square> {
    let king = pos.king_square(color);
    KING_STEPS
        .iter()
        .filter_map(|&(df, dr)| king.offset(df, dr))
        .filter(|&sq| !pos.piece_at(sq).is_color(color))
        .filter(|&sq| !attacks::attacks(pos, !color, sq))
        .collect()
}

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
