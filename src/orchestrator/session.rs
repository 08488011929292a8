//! Game sessions and the epoch that tells them apart.
//!
//! The epoch is the only state shared with thinking workers. It only ever
//! moves forward: once at every game start and once at every game end, so a
//! worker that captured an older value can never match again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::fog::visibility::FogMaps;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::ChessMove;
use crate::players::player::Player;

#[derive(Debug, Clone, Default)]
pub struct EpochCounter(Arc<AtomicU64>);

impl EpochCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Move to a fresh epoch and return it.
    #[inline]
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    pub fn is_current(&self, epoch: u64) -> bool {
        self.current() == epoch
    }
}

/// One game: board, seats and bookkeeping for the PGN record.
pub struct GameSession {
    pub epoch: u64,
    pub board: GameState,
    pub white: Player,
    pub black: Player,
    pub playing: bool,
    pub start_fen: String,
    pub moves: Vec<ChessMove>,
    pub fog: FogMaps,
}

impl GameSession {
    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn player_mut(&mut self, color: Color) -> &mut Player {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    #[inline]
    pub fn player_to_move(&self) -> &Player {
        self.player(self.board.side_to_move)
    }

    #[inline]
    pub fn player_not_on_move(&self) -> &Player {
        self.player(self.board.side_to_move.opposite())
    }

    #[inline]
    pub fn involves_human(&self) -> bool {
        self.white.is_human() || self.black.is_human()
    }
}
