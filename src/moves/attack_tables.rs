//! Attack bitboards for every piece kind.
//!
//! Leaper tables are built at compile time; slider attacks walk rays against
//! the current occupancy and include the first blocker.

use crate::game_state::chess_types::{Bitboard, Color, Square};

pub const KNIGHT_ATTACKS: [Bitboard; 64] = build_leaper_table(&[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
]);

pub const KING_ATTACKS: [Bitboard; 64] = build_leaper_table(&[
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
]);

pub const WHITE_PAWN_ATTACKS: [Bitboard; 64] = build_leaper_table(&[(-1, 1), (1, 1)]);
pub const BLACK_PAWN_ATTACKS: [Bitboard; 64] = build_leaper_table(&[(-1, -1), (1, -1)]);

const ROOK_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

#[inline]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square as usize]
}

/// Squares a pawn of `color` on `square` attacks diagonally.
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square as usize],
        Color::Black => BLACK_PAWN_ATTACKS[square as usize],
    }
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ROOK_DIRECTIONS
        .iter()
        .fold(0, |acc, (df, dr)| acc | trace_ray(square, *df, *dr, occupancy))
}

#[inline]
pub fn bishop_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    BISHOP_DIRECTIONS
        .iter()
        .fold(0, |acc, (df, dr)| acc | trace_ray(square, *df, *dr, occupancy))
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    rook_attacks(square, occupancy) | bishop_attacks(square, occupancy)
}

fn trace_ray(square: Square, file_step: i32, rank_step: i32, occupancy: Bitboard) -> Bitboard {
    let mut file = i32::from(square % 8) + file_step;
    let mut rank = i32::from(square / 8) + rank_step;
    let mut attacks = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;
        if occupancy & bit != 0 {
            break;
        }
        file += file_step;
        rank += rank_step;
    }

    attacks
}

const fn build_leaper_table(offsets: &[(i32, i32)]) -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;
        while i < offsets.len() {
            let f = file + offsets[i].0;
            let r = rank + offsets[i].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                attacks |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq] = attacks;
        sq += 1;
    }

    table
}
