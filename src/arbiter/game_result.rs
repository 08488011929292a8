//! Game results and the bundled terminal-state evaluator.
//!
//! Timeouts, illegal moves and arbiter draws are decided by the orchestrator;
//! the evaluator only ever reports states readable from the board.

use serde::{Deserialize, Serialize};

use crate::game_state::chess_rules::{FIFTY_MOVE_RULE_PLIES, REPETITION_DRAW_COUNT};
use crate::game_state::chess_types::*;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerator};
use crate::move_generation::square_attacks::is_king_in_check;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    InProgress,
    WhiteWins,
    BlackWins,
    DrawByStalemate,
    DrawByRepetition,
    DrawByFiftyMove,
    DrawByInsufficientMaterial,
    DrawByArbiter,
    WhiteTimeout,
    BlackTimeout,
    WhiteIllegalMove,
    BlackIllegalMove,
}

impl GameResult {
    #[inline]
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameResult::DrawByStalemate
                | GameResult::DrawByRepetition
                | GameResult::DrawByFiftyMove
                | GameResult::DrawByInsufficientMaterial
                | GameResult::DrawByArbiter
        )
    }

    /// White won, by mate or by Black forfeiting.
    #[inline]
    pub fn is_white_win(self) -> bool {
        matches!(
            self,
            GameResult::WhiteWins | GameResult::BlackTimeout | GameResult::BlackIllegalMove
        )
    }

    #[inline]
    pub fn is_black_win(self) -> bool {
        matches!(
            self,
            GameResult::BlackWins | GameResult::WhiteTimeout | GameResult::WhiteIllegalMove
        )
    }

    #[inline]
    pub fn is_timeout(self) -> bool {
        matches!(self, GameResult::WhiteTimeout | GameResult::BlackTimeout)
    }

    #[inline]
    pub fn is_illegal_move(self) -> bool {
        matches!(
            self,
            GameResult::WhiteIllegalMove | GameResult::BlackIllegalMove
        )
    }

    #[inline]
    pub fn is_finished(self) -> bool {
        self != GameResult::InProgress
    }

    pub fn timeout_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteTimeout,
            Color::Black => GameResult::BlackTimeout,
        }
    }

    pub fn illegal_move_by(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteIllegalMove,
            Color::Black => GameResult::BlackIllegalMove,
        }
    }

    pub fn pgn_result_string(self) -> &'static str {
        if self.is_white_win() {
            "1-0"
        } else if self.is_black_win() {
            "0-1"
        } else if self.is_draw() {
            "1/2-1/2"
        } else {
            "*"
        }
    }
}

/// Terminal-state detector consumed by the orchestrator after each move.
pub trait ResultEvaluator: Send + Sync {
    fn evaluate(&self, board: &GameState) -> MoveGenResult<GameResult>;
}

/// Standard rules over a `MoveGenerator`: mate, stalemate, fifty moves,
/// threefold repetition and dead material.
pub struct StandardArbiter<G: MoveGenerator> {
    generator: G,
}

impl<G: MoveGenerator> StandardArbiter<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: MoveGenerator> ResultEvaluator for StandardArbiter<G> {
    fn evaluate(&self, board: &GameState) -> MoveGenResult<GameResult> {
        if self.generator.legal_moves(board)?.is_empty() {
            if !is_king_in_check(board, board.side_to_move) {
                return Ok(GameResult::DrawByStalemate);
            }
            return Ok(match board.side_to_move {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            });
        }

        if board.halfmove_clock >= FIFTY_MOVE_RULE_PLIES {
            return Ok(GameResult::DrawByFiftyMove);
        }
        if board.repetition_count() >= REPETITION_DRAW_COUNT {
            return Ok(GameResult::DrawByRepetition);
        }
        if is_insufficient_material(board) {
            return Ok(GameResult::DrawByInsufficientMaterial);
        }

        Ok(GameResult::InProgress)
    }
}

const LIGHT_SQUARES: Bitboard = 0x55AA_55AA_55AA_55AA;

/// K v K, K+minor v K, and K+B v K+B with both bishops on one square colour.
pub fn is_insufficient_material(board: &GameState) -> bool {
    let heavy_or_pawn = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen];
    for color in [Color::White, Color::Black] {
        let pieces = &board.pieces[color.index()];
        if heavy_or_pawn.iter().any(|kind| pieces[kind.index()] != 0) {
            return false;
        }
    }

    let knights = |c: Color| board.pieces[c.index()][PieceKind::Knight.index()];
    let bishops = |c: Color| board.pieces[c.index()][PieceKind::Bishop.index()];
    let minors = |c: Color| (knights(c) | bishops(c)).count_ones();

    match (minors(Color::White), minors(Color::Black)) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => {
            let white_bishop = bishops(Color::White);
            let black_bishop = bishops(Color::Black);
            white_bishop != 0
                && black_bishop != 0
                && (white_bishop & LIGHT_SQUARES != 0) == (black_bishop & LIGHT_SQUARES != 0)
        }
        _ => false,
    }
}
