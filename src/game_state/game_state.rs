//! Live board state owned by a game session.
//!
//! `GameState` stores piece bitboards, occupancy caches, turn/state flags,
//! counters and the repetition history. Only the orchestrator's main context
//! mutates it; automated players receive clones.

use crate::codec::fen_generator::{encode_fen, EnPassantPolicy};
use crate::codec::fen_parser::decode_fen;
use crate::errors::ArenaResult;
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::*;
use crate::game_state::position_key::compute_position_key;
use crate::move_generation::move_apply::apply_move;
use crate::moves::chess_move::ChessMove;

#[derive(Debug, Clone)]
pub struct GameState {
    // [color][piece_kind]
    pub pieces: [[Bitboard; 6]; 2],

    pub occupancy_by_color: [Bitboard; 2],
    pub occupancy_all: Bitboard,

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    /// Half-moves since the last capture or pawn advance.
    pub halfmove_clock: u32,
    /// Plies played since the position the full-move number counts from.
    pub ply_count: u64,

    pub position_key: u64,
    pub repetition_history: Vec<u64>,

    null_move_stack: Vec<Option<Square>>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,

            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,

            halfmove_clock: 0,
            ply_count: 0,

            position_key: 0,
            repetition_history: Vec::new(),
            null_move_stack: Vec::new(),
        }
    }
}

impl GameState {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn new_game() -> Self {
        // The literal is a valid six-field FEN; decode cannot fail on it.
        Self::from_fen(STARTING_POSITION_FEN).unwrap_or_default()
    }

    pub fn from_fen(fen: &str) -> ArenaResult<Self> {
        Ok(Self::from_position(&decode_fen(fen)?))
    }

    /// Build a live board from a decoded position.
    ///
    /// The en-passant file is turned into the target square behind the pawn
    /// that just double-stepped, which depends on the side to move.
    pub fn from_position(position: &Position) -> Self {
        let mut state = Self::new_empty();

        for (sq, piece) in position.squares.iter().enumerate() {
            if let Some(piece) = piece {
                state.pieces[piece.color.index()][piece.kind.index()] |= 1u64 << sq;
            }
        }

        state.side_to_move = if position.white_to_move {
            Color::White
        } else {
            Color::Black
        };

        let mut rights = 0;
        if position.white_castle_kingside {
            rights |= CASTLE_WHITE_KINGSIDE;
        }
        if position.white_castle_queenside {
            rights |= CASTLE_WHITE_QUEENSIDE;
        }
        if position.black_castle_kingside {
            rights |= CASTLE_BLACK_KINGSIDE;
        }
        if position.black_castle_queenside {
            rights |= CASTLE_BLACK_QUEENSIDE;
        }
        state.castling_rights = rights;

        state.en_passant_square = if (1..=8).contains(&position.ep_file) {
            let rank = if position.white_to_move { 5 } else { 2 };
            Some(square_of(position.ep_file - 1, rank))
        } else {
            None
        };

        state.halfmove_clock = position.fifty_move_ply_count;
        let fullmove = u64::from(position.fullmove_number.max(1));
        let black_extra = u64::from(!position.white_to_move);
        state.ply_count = (fullmove - 1) * 2 + black_extra;

        state.recalc_occupancy();
        state.position_key = compute_position_key(&state);
        state.repetition_history.push(state.position_key);
        state
    }

    /// Full-move number as written in FEN: one at the start, bumped after Black moves.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        u32::try_from(self.ply_count / 2 + 1).unwrap_or(u32::MAX)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        encode_fen(self, EnPassantPolicy::AlwaysInclude)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let mask = 1u64 << square;
        if self.occupancy_all & mask == 0 {
            return None;
        }
        for color in [Color::White, Color::Black] {
            for kind in ALL_PIECE_KINDS {
                if self.pieces[color.index()][kind.index()] & mask != 0 {
                    return Some(Piece::new(kind, color));
                }
            }
        }
        None
    }

    #[inline]
    pub fn is_white_to_move(&self) -> bool {
        self.side_to_move.is_white()
    }

    /// Play `mv` on this board. The move must come from a generator for this
    /// position; use the legality gate before calling with untrusted input.
    pub fn make_move(&mut self, mv: ChessMove) -> ArenaResult<()> {
        let mut next = apply_move(self, mv)?;
        next.null_move_stack = std::mem::take(&mut self.null_move_stack);
        next.repetition_history.push(next.position_key);
        *self = next;
        Ok(())
    }

    /// Pass the turn without touching the pieces.
    pub fn make_null_move(&mut self) {
        self.null_move_stack.push(self.en_passant_square);
        self.en_passant_square = None;
        self.side_to_move = self.side_to_move.opposite();
        self.position_key = compute_position_key(self);
    }

    pub fn unmake_null_move(&mut self) {
        let Some(previous_ep) = self.null_move_stack.pop() else {
            return;
        };
        self.en_passant_square = previous_ep;
        self.side_to_move = self.side_to_move.opposite();
        self.position_key = compute_position_key(self);
    }

    /// Number of times the current position has occurred, including now.
    pub fn repetition_count(&self) -> usize {
        self.repetition_history
            .iter()
            .filter(|key| **key == self.position_key)
            .count()
    }

    pub(crate) fn recalc_occupancy(&mut self) {
        for color in [Color::White, Color::Black] {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .copied()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[0] | self.occupancy_by_color[1];
    }
}
