//! One-ply material grabber: takes the most valuable piece it can see,
//! breaking ties at random.

use rand::prelude::IndexedRandom;

use crate::game_state::chess_types::{GameState, PieceKind};
use crate::move_generation::legal_move_generator::StandardMoveGenerator;
use crate::move_generation::move_generator::MoveGenerator;
use crate::moves::chess_move::{ChessMove, MoveFlag};
use crate::players::bot::{Bot, BotTimer, BotView};

pub struct GreedyBot {
    move_generator: StandardMoveGenerator,
}

impl GreedyBot {
    pub fn new() -> Self {
        Self {
            move_generator: StandardMoveGenerator,
        }
    }

    #[inline]
    fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20000,
        }
    }

    fn capture_value(board: &GameState, mv: ChessMove) -> i32 {
        if mv.flag() == MoveFlag::EnPassantCapture {
            return Self::piece_value(PieceKind::Pawn);
        }
        board
            .piece_at(mv.to())
            .map_or(0, |victim| Self::piece_value(victim.kind))
    }
}

impl Default for GreedyBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot for GreedyBot {
    fn name(&self) -> &str {
        "Greedy"
    }

    fn compute_move(&mut self, view: &BotView, _timer: &BotTimer) -> Result<ChessMove, String> {
        let legal_moves = self
            .move_generator
            .legal_moves(&view.board)
            .map_err(|e| e.to_string())?;

        let mut best_value = i32::MIN;
        let mut best_moves = Vec::new();

        for mv in legal_moves {
            let value = Self::capture_value(&view.board, mv);
            if value > best_value {
                best_value = value;
                best_moves.clear();
                best_moves.push(mv);
            } else if value == best_value {
                best_moves.push(mv);
            }
        }

        let mut rng = rand::rng();
        best_moves
            .as_slice()
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| "no legal move on the visible board".to_owned())
    }
}
