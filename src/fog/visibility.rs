//! Fog-of-war visibility.
//!
//! A side sees the origin and destination of every fog-aware move it could
//! make plus every square its own pieces stand on. The generator only
//! enumerates for the side to move, so the other side's set is taken through a
//! null move that is unmade before returning.

use crate::game_state::chess_types::*;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct VisibilitySet(Bitboard);

impl VisibilitySet {
    pub const EVERYTHING: VisibilitySet = VisibilitySet(u64::MAX);

    #[inline]
    pub const fn from_bits(bits: Bitboard) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> Bitboard {
        self.0
    }

    #[inline]
    pub const fn contains(self, square: Square) -> bool {
        self.0 & (1u64 << square) != 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Both sides' sets for one ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FogMaps {
    pub white: VisibilitySet,
    pub black: VisibilitySet,
}

impl FogMaps {
    #[inline]
    pub fn for_color(&self, color: Color) -> VisibilitySet {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// Squares visible to the side to move.
pub fn side_to_move_visibility(
    generator: &dyn MoveGenerator,
    board: &GameState,
) -> MoveGenResult<VisibilitySet> {
    let mut bits = board.occupancy_by_color[board.side_to_move.index()];
    for mv in generator.fog_aware_moves(board)? {
        bits |= (1u64 << mv.from()) | (1u64 << mv.to());
    }
    Ok(VisibilitySet(bits))
}

/// Squares visible to `side`, toggling the turn with a null move when needed.
pub fn visibility_for(
    generator: &dyn MoveGenerator,
    board: &mut GameState,
    side: Color,
) -> MoveGenResult<VisibilitySet> {
    if board.side_to_move == side {
        return side_to_move_visibility(generator, board);
    }

    board.make_null_move();
    let visible = side_to_move_visibility(generator, board);
    board.unmake_null_move();
    visible
}

pub fn refresh_both_sides(
    generator: &dyn MoveGenerator,
    board: &mut GameState,
) -> MoveGenResult<FogMaps> {
    Ok(FogMaps {
        white: visibility_for(generator, board, Color::White)?,
        black: visibility_for(generator, board, Color::Black)?,
    })
}
