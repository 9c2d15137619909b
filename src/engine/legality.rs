//! The single entry point for move requests.
//!
//! `try_move` runs a request through a fixed sequence of gates and stops at
//! the first failure. A rejected request leaves the position untouched; an
//! accepted one is committed and the opponent's king is re-analysed.

use std::fmt;

use tracing::{debug, info};

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::castling;
use crate::engine::check::{CheckState, KingStatus};
use crate::engine::pieces;
use crate::engine::types::{CastleSide, Color, Piece, PieceType, RejectReason, Square, Verdict};

/// One accepted move, as it was played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mover: Color,
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Piece,
    pub castle: Option<CastleSide>,
    pub promotion: Option<PieceType>,
    /// Status of the opponent's king after the move.
    pub reply: KingStatus,
}

impl MoveRecord {
    pub fn verdict(&self) -> Verdict {
        match self.reply {
            KingStatus::None => Verdict::Accepted,
            KingStatus::InCheck => Verdict::AcceptedCheck,
            KingStatus::Checkmated => Verdict::AcceptedCheckmate,
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char(Color::Black))?;
        }
        Ok(())
    }
}

/// Attempt `from` → `to` for the side to move.
///
/// Coordinates are the raw request text (`"e2"`, case-insensitive).
pub fn try_move(
    pos: &mut Position,
    state: &mut CheckState,
    from: &str,
    to: &str,
    promotion: PieceType,
) -> Verdict {
    match attempt(pos, state, from, to, promotion) {
        Ok(record) => record.verdict(),
        Err(reason) => Verdict::Rejected(reason),
    }
}

/// Like `try_move`, but hands back the full record of an accepted move.
pub fn attempt(
    pos: &mut Position,
    state: &mut CheckState,
    from: &str,
    to: &str,
    promotion: PieceType,
) -> Result<MoveRecord, RejectReason> {
    let result = run_gates(pos, state, from, to, promotion);
    match &result {
        Ok(record) => match record.reply {
            KingStatus::Checkmated => {
                info!(mover = %record.mover, mv = %record, "checkmate");
            }
            KingStatus::InCheck => {
                info!(mover = %record.mover, mv = %record, "check");
            }
            KingStatus::None => {
                debug!(mover = %record.mover, mv = %record, "move accepted");
            }
        },
        Err(reason) => {
            debug!(from, to, %reason, "move rejected");
        }
    }
    result
}

fn run_gates(
    pos: &mut Position,
    state: &mut CheckState,
    from: &str,
    to: &str,
    promotion: PieceType,
) -> Result<MoveRecord, RejectReason> {
    if state.is_game_over() {
        return Err(RejectReason::GameOver);
    }

    // ---- Coordinates ----
    let (from, to) = (from.trim(), to.trim());
    if from.eq_ignore_ascii_case(to) {
        return Err(RejectReason::SameSquare);
    }
    let from_sq: Square = from
        .parse()
        .map_err(|_| RejectReason::OffBoard(from.to_string()))?;
    let to_sq: Square = to
        .parse()
        .map_err(|_| RejectReason::OffBoard(to.to_string()))?;

    // ---- Ownership ----
    let piece = pos.piece_at(from_sq);
    let (Some(color), Some(kind)) = (piece.color(), piece.kind()) else {
        return Err(RejectReason::EmptyOrigin(from_sq));
    };
    if color != pos.side_to_move() {
        return Err(RejectReason::WrongColor {
            square: from_sq,
            piece,
        });
    }

    // ---- Castling ----
    if let Some(side) = castling::castle_side(pos, from_sq, to_sq) {
        castling::validate(pos, color, side)?;
        pos.castle(color, side);
        debug!(%color, %side, "castled");
        let reply = state.record_move(pos, color);
        return Ok(MoveRecord {
            mover: color,
            piece,
            from: from_sq,
            to: to_sq,
            captured: Piece::Empty,
            castle: Some(side),
            promotion: None,
            reply,
        });
    }

    // ---- Piece rules ----
    if !pieces::geometry_valid(pos, from_sq, to_sq) {
        return Err(RejectReason::IllegalGeometry {
            piece: kind,
            from: from_sq,
            to: to_sq,
        });
    }
    if !pieces::path_clear(pos, from_sq, to_sq) {
        return Err(RejectReason::PathBlocked {
            from: from_sq,
            to: to_sq,
        });
    }
    if pos.piece_at(to_sq).is_color(color) {
        return Err(RejectReason::FriendlyFire(to_sq));
    }

    // ---- Speculative apply ----
    let mut txn = pos.begin();
    let applied = txn.apply_move(from_sq, to_sq, promotion);
    if attacks::king_attacked(&txn, color) {
        txn.rollback();
        return Err(RejectReason::LeavesKingInCheck);
    }
    txn.commit();

    let reply = state.record_move(pos, color);
    Ok(MoveRecord {
        mover: color,
        piece,
        from: from_sq,
        to: to_sq,
        captured: applied.captured,
        castle: None,
        promotion: applied.promotion,
        reply,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
