//! Automated-player seam.
//!
//! A bot is handed a `BotView` (its side's fogged copy of the board) and a
//! `BotTimer`, and answers with a move. It never sees the live board.

use crate::codec::fen_generator::encode_fogged_fen;
use crate::fog::visibility::VisibilitySet;
use crate::game_state::chess_types::*;
use crate::game_state::position_key::compute_position_key;
use crate::moves::chess_move::ChessMove;

/// Time figures passed to a bot with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BotTimer {
    pub own_remaining_ms: u64,
    pub opponent_remaining_ms: u64,
    pub game_duration_ms: u64,
    pub increment_ms: u64,
}

/// What one side is allowed to know about the position.
#[derive(Debug, Clone)]
pub struct BotView {
    /// Board copy with every opponent piece outside `visibility` removed.
    pub board: GameState,
    /// Board field with `?` on unseen squares.
    pub fogged_fen: String,
    pub visibility: VisibilitySet,
    pub color: Color,
}

impl BotView {
    pub fn new(live: &GameState, color: Color, visibility: VisibilitySet) -> Self {
        let mut board = live.clone();
        let seen = visibility.bits();
        let opponent = color.opposite().index();

        for bitboard in board.pieces[opponent].iter_mut() {
            *bitboard &= seen;
        }
        board.recalc_occupancy();

        if board
            .en_passant_square
            .is_some_and(|sq| !visibility.contains(sq))
        {
            board.en_passant_square = None;
        }

        board.position_key = compute_position_key(&board);
        board.repetition_history.clear();
        board.repetition_history.push(board.position_key);

        Self {
            fogged_fen: encode_fogged_fen(live, seen),
            board,
            visibility,
            color,
        }
    }

    /// A view that hides nothing, used when fog of war is switched off.
    pub fn unfogged(live: &GameState, color: Color) -> Self {
        Self {
            board: live.clone(),
            fogged_fen: encode_fogged_fen(live, VisibilitySet::EVERYTHING.bits()),
            visibility: VisibilitySet::EVERYTHING,
            color,
        }
    }
}

pub trait Bot: Send {
    fn name(&self) -> &str;

    /// Pick a move for `view.color`. An `Err` is reported as a fault of this
    /// player; it is never retried.
    fn compute_move(&mut self, view: &BotView, timer: &BotTimer) -> Result<ChessMove, String>;

    /// Called when the game this bot was playing is superseded.
    fn stop(&mut self) {}
}
