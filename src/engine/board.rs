//! Mailbox chess position representation.
//!
//! `Position` keeps a total square → occupant table (empty squares hold
//! `Piece::Empty`), the side to move, cached king squares, castling rights,
//! the en-passant target and the move counters. Speculative moves are made
//! through `snapshot`/`restore` or a `Transaction` that rolls back on drop.

use std::ops::{Deref, DerefMut};

use serde::Serialize;

use crate::engine::types::{
    CastleSide, CastlingRights, ChessError, Color, Piece, PieceType, Square,
};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: [Piece; Square::NUM],
    side_to_move: Color,
    king_squares: [Square; 2],
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
}

/// What a committed `apply_move` actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub piece: Piece,
    pub captured: Piece,
    /// Square the captured piece stood on (differs from `to` for en passant).
    pub captured_on: Option<Square>,
    pub promotion: Option<PieceType>,
}

impl Position {
    /// Create a board with no pieces. Both cached king squares point at a1
    /// until kings are placed.
    pub fn empty() -> Self {
        Position {
            board: [Piece::Empty; Square::NUM],
            side_to_move: Color::White,
            king_squares: [Square(0); 2],
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_empty()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Squares currently holding a piece of `color`.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&sq| self.piece_at(sq).is_color(color))
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Put `piece` on `sq`, replacing whatever was there. Keeps the cached
    /// king square in step when a king is placed.
    pub fn put_piece(&mut self, sq: Square, piece: Piece) {
        if let Piece::King(color) = piece {
            self.king_squares[color.index()] = sq;
        }
        self.board[sq.index()] = piece;
    }

    /// Clear `sq`, returning what stood there.
    pub fn remove_piece(&mut self, sq: Square) -> Piece {
        std::mem::take(&mut self.board[sq.index()])
    }

    /// Replace the pawn on `sq` with `kind` of the same colour.
    pub fn promote(&mut self, sq: Square, kind: PieceType) {
        if let Piece::Pawn(color) = self.piece_at(sq) {
            self.board[sq.index()] = Piece::new(color, kind);
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Copy of the whole position for a later `restore`.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.clone())
    }

    /// Return to a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        *self = snapshot.0;
    }

    /// Start a speculative change. Dropping the transaction without calling
    /// `commit` puts the position back exactly as it was.
    pub fn begin(&mut self) -> Transaction<'_> {
        let saved = self.snapshot();
        Transaction {
            position: self,
            saved: Some(saved),
        }
    }

    // -----------------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------------

    /// Move the piece on `from` to `to` and hand the turn to the opponent.
    ///
    /// Performs the side effects that belong to the move itself: the en
    /// passant victim is removed, the king cache and castling rights follow
    /// the move, the en-passant target is cleared and set again only by a
    /// two-square pawn advance, and a pawn reaching the far rank becomes
    /// `promotion`. The caller is responsible for legality.
    pub fn apply_move(&mut self, from: Square, to: Square, promotion: PieceType) -> AppliedMove {
        let piece = self.remove_piece(from);
        let us = piece.color().unwrap_or(self.side_to_move);
        let them = !us;
        let (df, dr) = from.delta(to);

        // En passant: diagonal pawn step into an empty square.
        let mut captured = self.piece_at(to);
        let mut captured_on = (!captured.is_empty()).then_some(to);
        if matches!(piece, Piece::Pawn(_))
            && df != 0
            && captured.is_empty()
            && let Some(victim_sq) = to.offset(0, -us.forward())
            && self.piece_at(victim_sq) == Piece::Pawn(them)
        {
            captured = self.remove_piece(victim_sq);
            captured_on = Some(victim_sq);
        }

        self.put_piece(to, piece);

        // ---- Promotion ----
        let mut promoted = None;
        if matches!(piece, Piece::Pawn(_)) && to.rank() == them.back_rank() {
            self.promote(to, promotion);
            promoted = Some(promotion);
        }

        // ---- Castling rights ----
        if matches!(piece, Piece::King(_)) && from == home_king_square(us) {
            self.castling_rights.remove(CastlingRights::king_flag(us));
        }
        self.castling_rights.remove(rook_square_right(from));
        if captured_on == Some(to) {
            self.castling_rights.remove(rook_square_right(to));
        }

        // ---- En passant target ----
        self.en_passant = None;
        if matches!(piece, Piece::Pawn(_)) && df == 0 && dr.abs() == 2 {
            self.en_passant = from.offset(0, us.forward());
        }

        // ---- Counters ----
        if matches!(piece, Piece::Pawn(_)) || !captured.is_empty() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = them;

        AppliedMove {
            piece,
            captured,
            captured_on,
            promotion: promoted,
        }
    }

    /// Relocate king and rook for a castle by `color` and hand over the turn.
    ///
    /// Legality is the castling authority's job; this only performs the
    /// relocation and permanently clears the side's castling flag.
    pub fn castle(&mut self, color: Color, side: CastleSide) {
        let squares = CastleSquares::of(color, side);
        let king = self.remove_piece(squares.king_from);
        let rook = self.remove_piece(squares.rook_from);
        self.put_piece(squares.king_to, king);
        self.put_piece(squares.rook_to, rook);

        self.castling_rights
            .remove(CastlingRights::king_flag(color) | CastlingRights::side_flag(color, side));
        self.en_passant = None;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        if color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = !color;
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                s.push(self.piece_at(sq).to_char().unwrap_or('.'));
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }

    /// Serializable view of the board for rendering.
    pub fn board_snapshot(&self) -> BoardSnapshot {
        let rows = (0..8u8)
            .rev()
            .map(|rank| {
                (0..8u8)
                    .map(|file| self.piece_at(Square::from_file_rank(file, rank)).code())
                    .collect::<Vec<_>>()
            })
            .collect();
        BoardSnapshot {
            side_to_move: self.side_to_move,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot / Transaction
// ---------------------------------------------------------------------------

/// Saved copy of a position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot(Position);

/// A speculative change to a position.
///
/// Derefs to the position so mutation primitives can be called directly.
/// `commit` keeps the changes; `rollback` or dropping discards them.
pub struct Transaction<'a> {
    position: &'a mut Position,
    saved: Option<Snapshot>,
}

impl Transaction<'_> {
    pub fn commit(mut self) {
        self.saved = None;
    }

    pub fn rollback(mut self) {
        if let Some(saved) = self.saved.take() {
            self.position.restore(saved);
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        &*self.position
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        &mut *self.position
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.position.restore(saved);
        }
    }
}

// ---------------------------------------------------------------------------
// BoardSnapshot
// ---------------------------------------------------------------------------

/// Grid of occupant codes, rank 8 first. `None` marks an empty square.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub side_to_move: Color,
    pub rows: Vec<Vec<Option<String>>>,
}

// ---------------------------------------------------------------------------
// Castling helpers
// ---------------------------------------------------------------------------

/// King and rook squares involved in one castle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastleSquares {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl CastleSquares {
    pub fn of(color: Color, side: CastleSide) -> Self {
        let rank = color.back_rank();
        let at = |file: u8| Square::from_file_rank(file, rank);
        match side {
            CastleSide::Kingside => CastleSquares {
                king_from: at(4),
                king_to: at(6),
                rook_from: at(7),
                rook_to: at(5),
            },
            CastleSide::Queenside => CastleSquares {
                king_from: at(4),
                king_to: at(2),
                rook_from: at(0),
                rook_to: at(3),
            },
        }
    }
}

pub fn home_king_square(color: Color) -> Square {
    Square::from_file_rank(4, color.back_rank())
}

/// Rook-side right tied to a corner square; 0 for every other square.
fn rook_square_right(sq: Square) -> u8 {
    match sq.0 {
        0 => CastlingRights::WHITE_QUEENSIDE,
        7 => CastlingRights::WHITE_KINGSIDE,
        56 => CastlingRights::BLACK_QUEENSIDE,
        63 => CastlingRights::BLACK_KINGSIDE,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates all 6 fields (piece placement, side to move, castling,
    /// en passant, halfmove clock, fullmove number) and ensures exactly one
    /// king per side.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();
        let mut king_count = [0u32; 2];

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, kind)) = PieceType::from_char(ch) {
                    if kind == PieceType::King {
                        king_count[color.index()] += 1;
                    }
                    pos.put_piece(Square::from_file_rank(file, rank), Piece::new(color, kind));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        // Validate exactly one king per side.
        for color in [Color::White, Color::Black] {
            let count = king_count[color.index()];
            if count != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {count} kings (expected 1)"
                )));
            }
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // En passant target must be on rank 3 (for Black) or rank 6 (for White).
            let rank = ep_sq.rank();
            if rank != 2 && rank != 5 {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        #[cfg(debug_assertions)]
        pos.assert_consistent();

        Ok(pos)
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)).to_char() {
                    Some(ch) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(ch);
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: Side to move -----
        fen.push(' ');
        fen.push(self.side_to_move.prefix());

        // ----- Field 3: Castling -----
        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        // ----- Field 4: En passant -----
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Fields 5 and 6: counters -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    /// Verify that the cached king squares match the board.
    /// Available in debug builds and test builds.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for color in [Color::White, Color::Black] {
            let kings: Vec<Square> = Square::all()
                .filter(|&sq| self.piece_at(sq) == Piece::King(color))
                .collect();
            assert_eq!(kings.len(), 1, "{color} must have exactly one king");
            assert_eq!(
                kings[0],
                self.king_square(color),
                "king cache mismatch for {color:?}",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn starting() -> Position {
        Position::starting()
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    // ===================================================================
    // Starting position
    // ===================================================================

    #[test]
    fn starting_position_fen() {
        assert_eq!(
            starting().to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn starting_position_state() {
        let pos = starting();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.king_square(Color::White), sq("e1"));
        assert_eq!(pos.king_square(Color::Black), sq("e8"));
    }

    #[test]
    fn starting_piece_counts() {
        let pos = starting();
        assert_eq!(pos.squares_of(Color::White).count(), 16);
        assert_eq!(pos.squares_of(Color::Black).count(), 16);
        assert_eq!(Square::all().filter(|&s| pos.is_empty(s)).count(), 32);
    }

    #[test]
    fn piece_at_back_ranks() {
        let pos = starting();
        assert_eq!(pos.piece_at(sq("a1")), Piece::Rook(Color::White));
        assert_eq!(pos.piece_at(sq("b1")), Piece::Knight(Color::White));
        assert_eq!(pos.piece_at(sq("d1")), Piece::Queen(Color::White));
        assert_eq!(pos.piece_at(sq("f8")), Piece::Bishop(Color::Black));
        assert_eq!(pos.piece_at(sq("e8")), Piece::King(Color::Black));
        assert_eq!(pos.piece_at(sq("e4")), Piece::Empty);
    }

    // ===================================================================
    // apply_move
    // ===================================================================

    #[test]
    fn double_push_sets_en_passant_target() {
        let mut pos = starting();
        pos.apply_move(sq("e2"), sq("e4"), PieceType::Queen);
        assert_eq!(pos.piece_at(sq("e4")), Piece::Pawn(Color::White));
        assert_eq!(pos.piece_at(sq("e2")), Piece::Empty);
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        assert_eq!(pos.side_to_move(), Color::Black);
    }

    #[test]
    fn next_move_clears_en_passant_target() {
        let mut pos = starting();
        pos.apply_move(sq("e2"), sq("e4"), PieceType::Queen);
        pos.apply_move(sq("g8"), sq("f6"), PieceType::Queen);
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.fullmove_number(), 2);
    }

    #[test]
    fn fullmove_number_saturates() {
        let mut quiet = pos("4k3/8/8/8/8/8/8/4K3 b - - 0 65535");
        quiet.apply_move(sq("e8"), sq("d8"), PieceType::Queen);
        assert_eq!(quiet.fullmove_number(), u16::MAX);

        let mut castled = pos("r3k3/8/8/8/8/8/8/4K3 b q - 0 65535");
        castled.castle(Color::Black, CastleSide::Queenside);
        assert_eq!(castled.fullmove_number(), u16::MAX);
        assert!(castled.to_fen().ends_with(" 65535"));
    }

    #[test]
    fn en_passant_capture_removes_victim() {
        let mut pos = pos("4k3/8/8/pP6/8/8/8/4K3 w - a6 0 1");
        let applied = pos.apply_move(sq("b5"), sq("a6"), PieceType::Queen);
        assert_eq!(pos.piece_at(sq("a6")), Piece::Pawn(Color::White));
        assert_eq!(pos.piece_at(sq("a5")), Piece::Empty);
        assert_eq!(applied.captured, Piece::Pawn(Color::Black));
        assert_eq!(applied.captured_on, Some(sq("a5")));
    }

    #[test]
    fn promotion_on_far_rank() {
        let mut pos = pos("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let applied = pos.apply_move(sq("a7"), sq("a8"), PieceType::Knight);
        assert_eq!(pos.piece_at(sq("a8")), Piece::Knight(Color::White));
        assert_eq!(applied.promotion, Some(PieceType::Knight));
    }

    #[test]
    fn king_move_updates_cache_and_rights() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        pos.apply_move(sq("e1"), sq("f1"), PieceType::Queen);
        assert_eq!(pos.king_square(Color::White), sq("f1"));
        assert!(!pos.castling_rights().king_may_castle(Color::White));
        assert!(pos.castling_rights().king_may_castle(Color::Black));
        pos.assert_consistent();
    }

    #[test]
    fn rook_moves_clear_one_side_then_king_flag() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        pos.apply_move(sq("a8"), sq("a7"), PieceType::Queen);
        assert!(!pos.castling_rights().can_castle_queenside(Color::Black));
        assert!(pos.castling_rights().can_castle_kingside(Color::Black));
        pos.apply_move(sq("h1"), sq("h2"), PieceType::Queen);
        pos.apply_move(sq("h8"), sq("h7"), PieceType::Queen);
        assert!(!pos.castling_rights().king_may_castle(Color::Black));
        assert!(pos.castling_rights().can_castle_queenside(Color::White));
    }

    #[test]
    fn capture_on_rook_corner_clears_right() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        pos.apply_move(sq("a8"), sq("a1"), PieceType::Queen);
        assert!(!pos.castling_rights().can_castle_queenside(Color::White));
    }

    // ===================================================================
    // castle
    // ===================================================================

    #[test]
    fn castle_relocates_king_and_rook() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        pos.castle(Color::White, CastleSide::Kingside);
        assert_eq!(pos.piece_at(sq("g1")), Piece::King(Color::White));
        assert_eq!(pos.piece_at(sq("f1")), Piece::Rook(Color::White));
        assert!(pos.is_empty(sq("e1")));
        assert!(pos.is_empty(sq("h1")));
        assert_eq!(pos.king_square(Color::White), sq("g1"));
        assert!(!pos.castling_rights().king_may_castle(Color::White));
        assert_eq!(pos.side_to_move(), Color::Black);
    }

    #[test]
    fn castle_queenside_black() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        pos.castle(Color::Black, CastleSide::Queenside);
        assert_eq!(pos.piece_at(sq("c8")), Piece::King(Color::Black));
        assert_eq!(pos.piece_at(sq("d8")), Piece::Rook(Color::Black));
        assert_eq!(pos.castling_rights().to_fen(), "KQ");
    }

    // ===================================================================
    // Snapshot / transaction
    // ===================================================================

    #[test]
    fn restore_returns_identical_position() {
        let mut pos = starting();
        let before = pos.clone();
        let snap = pos.snapshot();
        pos.apply_move(sq("e2"), sq("e4"), PieceType::Queen);
        assert_ne!(pos, before);
        pos.restore(snap);
        assert_eq!(pos, before);
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut pos = pos("4k3/8/8/pP6/8/8/8/4K3 w - a6 0 1");
        let before = pos.clone();
        {
            let mut txn = pos.begin();
            txn.apply_move(sq("b5"), sq("a6"), PieceType::Queen);
            assert!(txn.is_empty(sq("a5")));
        }
        // The captured pawn comes back.
        assert_eq!(pos, before);
    }

    #[test]
    fn committed_transaction_sticks() {
        let mut pos = starting();
        let mut txn = pos.begin();
        txn.apply_move(sq("g1"), sq("f3"), PieceType::Queen);
        txn.commit();
        assert_eq!(pos.piece_at(sq("f3")), Piece::Knight(Color::White));
    }

    #[test]
    fn explicit_rollback() {
        let mut pos = starting();
        let before = pos.clone();
        let mut txn = pos.begin();
        txn.castle(Color::White, CastleSide::Kingside);
        txn.rollback();
        assert_eq!(pos, before);
    }

    // ===================================================================
    // FEN
    // ===================================================================

    #[test]
    fn fen_round_trips() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w Kq - 5 20",
        ] {
            assert_eq!(pos(fen).to_fen(), fen);
        }
    }

    #[test]
    fn fen_errors() {
        for bad in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
            "rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XYZ - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e4 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR w KQkq - 0 1",
            "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ] {
            assert!(Position::from_fen(bad).is_err(), "accepted bad FEN {bad}");
        }
    }

    #[test]
    fn fen_kings_fill_cache() {
        let pos = pos("8/8/8/3k4/8/8/8/6K1 w - - 0 1");
        assert_eq!(pos.king_square(Color::White), sq("g1"));
        assert_eq!(pos.king_square(Color::Black), sq("d5"));
    }

    // ===================================================================
    // Display / snapshot
    // ===================================================================

    #[test]
    fn board_string_starting() {
        let s = starting().board_string();
        assert!(s.starts_with("8 r n b q k b n r"));
        assert!(s.ends_with("a b c d e f g h"));
    }

    #[test]
    fn board_snapshot_rows() {
        let snap = starting().board_snapshot();
        assert_eq!(snap.rows.len(), 8);
        assert_eq!(snap.rows[0][0].as_deref(), Some("bR"));
        assert_eq!(snap.rows[7][4].as_deref(), Some("wK"));
        assert_eq!(snap.rows[6][3].as_deref(), Some("wp"));
        assert_eq!(snap.rows[3][0], None);
    }
}
