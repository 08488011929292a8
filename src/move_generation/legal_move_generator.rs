//! Bundled move generator.
//!
//! Legal moves are the pseudo-legal moves that do not leave the mover's king
//! attacked. Fog-aware moves are the pseudo-legal moves unfiltered.

use crate::game_state::game_state::GameState;
use crate::move_generation::move_apply::apply_move;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerationError, MoveGenerator};
use crate::move_generation::pseudo_legal::generate_pseudo_legal_moves;
use crate::move_generation::square_attacks::is_king_in_check;
use crate::moves::chess_move::ChessMove;

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMoveGenerator;

impl MoveGenerator for StandardMoveGenerator {
    fn legal_moves(&self, board: &GameState) -> MoveGenResult<Vec<ChessMove>> {
        let pseudo = generate_pseudo_legal_moves(board);
        let mut legal = Vec::with_capacity(pseudo.len());

        for mv in pseudo {
            let next = apply_move(board, mv)
                .map_err(|e| MoveGenerationError::InvalidState(e.to_string()))?;
            if !is_king_in_check(&next, board.side_to_move) {
                legal.push(mv);
            }
        }

        Ok(legal)
    }

    fn fog_aware_moves(&self, board: &GameState) -> MoveGenResult<Vec<ChessMove>> {
        Ok(generate_pseudo_legal_moves(board))
    }
}
