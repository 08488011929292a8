//! Zobrist-style position keys for repetition tracking.
//!
//! Keys come from a fixed splitmix64 seed so the same position always hashes
//! the same way across runs and threads.

use std::sync::OnceLock;

use crate::game_state::{chess_types::*, game_state::GameState};

#[derive(Debug)]
struct KeyTables {
    piece_square: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<KeyTables> = OnceLock::new();

#[inline]
fn tables() -> &'static KeyTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> KeyTables {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for piece in color {
            for key in piece {
                *key = splitmix64(&mut seed);
            }
        }
    }

    let black_to_move = splitmix64(&mut seed);

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = splitmix64(&mut seed);
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = splitmix64(&mut seed);
    }

    KeyTables {
        piece_square,
        black_to_move,
        castling,
        en_passant_file,
    }
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash everything that makes two positions the same for repetition purposes.
pub fn compute_position_key(board: &GameState) -> u64 {
    let t = tables();
    let mut key = 0u64;

    for color in [Color::White, Color::Black] {
        for kind in ALL_PIECE_KINDS {
            let mut bb = board.pieces[color.index()][kind.index()];
            while bb != 0 {
                let sq = bb.trailing_zeros() as usize;
                key ^= t.piece_square[color.index()][kind.index()][sq];
                bb &= bb - 1;
            }
        }
    }

    if board.side_to_move == Color::Black {
        key ^= t.black_to_move;
    }
    key ^= t.castling[(board.castling_rights & 0x0F) as usize];
    if let Some(ep) = board.en_passant_square {
        key ^= t.en_passant_file[file_of(ep) as usize];
    }

    key
}
