pub mod attacks;
pub mod board;
pub mod castling;
pub mod check;
pub mod game;
pub mod legality;
pub mod pieces;
pub mod types;

pub use board::{BoardSnapshot, Position, Transaction};
pub use check::{CheckState, KingStatus};
pub use game::Game;
pub use legality::{MoveRecord, try_move};
pub use types::*;
