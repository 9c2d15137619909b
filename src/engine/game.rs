//! Stateful game controller wrapping Position.
//!
//! `Game` owns the position, the per-side check state and the history of
//! accepted moves. It is the type the session driver talks to.

use crate::engine::board::{BoardSnapshot, Position};
use crate::engine::check::{self, CheckState, KingStatus};
use crate::engine::legality::{self, MoveRecord};
use crate::engine::types::{ChessError, Color, PieceType, Verdict};

// =========================================================================
// Game
// =========================================================================

/// A chess game from the standard arrangement (or a FEN) to checkmate.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    check_state: CheckState,
    history: Vec<MoveRecord>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self {
            position: Position::starting(),
            check_state: CheckState::default(),
            history: Vec::new(),
        }
    }

    /// Create a game from a FEN string. The side to move is analysed
    /// immediately, so a FEN with a mated king starts out finished.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let position = Position::from_fen(fen)?;
        let mut check_state = CheckState::default();
        let to_move = position.side_to_move();
        if check::analyze(&position, to_move) != KingStatus::None {
            check_state.record_move(&position, !to_move);
        }
        Ok(Self {
            position,
            check_state,
            history: Vec::new(),
        })
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Accepted moves in order.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.check_state.is_in_check(color)
    }

    pub fn is_checkmated(&self, color: Color) -> bool {
        self.check_state.is_checkmated(color)
    }

    pub fn is_game_over(&self) -> bool {
        self.check_state.is_game_over()
    }

    /// The side that delivered checkmate, if any.
    pub fn winner(&self) -> Option<Color> {
        self.check_state.winner()
    }

    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.position.board_snapshot()
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    /// Attempt a move given as two coordinates and an optional promotion
    /// letter (`R`, `N`, `B` or `Q`; anything else means queen).
    pub fn try_move(&mut self, from: &str, to: &str, promotion: Option<&str>) -> Verdict {
        let promotion = PieceType::promotion_choice(promotion);
        match legality::attempt(
            &mut self.position,
            &mut self.check_state,
            from,
            to,
            promotion,
        ) {
            Ok(record) => {
                let verdict = record.verdict();
                self.history.push(record);
                verdict
            }
            Err(reason) => Verdict::Rejected(reason),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
