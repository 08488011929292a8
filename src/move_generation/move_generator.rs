//! Move-generator seam.
//!
//! The orchestrator only ever asks two questions of a generator: the legal
//! moves in a position (the legality authority) and the fog-aware pseudo-legal
//! moves (used for visibility only).

use std::error::Error;
use std::fmt;

use crate::game_state::game_state::GameState;
use crate::moves::chess_move::ChessMove;

pub type MoveGenResult<T> = Result<T, MoveGenerationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveGenerationError {
    InvalidState(String),
}

impl fmt::Display for MoveGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveGenerationError::InvalidState(msg) => write!(f, "invalid game state: {msg}"),
        }
    }
}

impl Error for MoveGenerationError {}

pub trait MoveGenerator: Send + Sync {
    /// Fully legal moves for the side to move.
    fn legal_moves(&self, board: &GameState) -> MoveGenResult<Vec<ChessMove>>;

    /// Pseudo-legal moves for the side to move, ignoring whether the mover's
    /// own king is left attacked.
    fn fog_aware_moves(&self, board: &GameState) -> MoveGenResult<Vec<ChessMove>>;
}
