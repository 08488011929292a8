//! FEN text to `Position`.
//!
//! The board and side-to-move fields are required. Castling, en-passant and
//! both counters are read permissively: anything absent or unreadable falls
//! back to "none" / zero instead of failing the decode.

use crate::errors::{ArenaError, ArenaResult};
use crate::game_state::chess_rules::FILE_NAMES;
use crate::game_state::chess_types::{square_of, Piece, Position};

pub fn decode_fen(fen: &str) -> ArenaResult<Position> {
    let sections: Vec<&str> = fen.split_whitespace().collect();

    let board_part = sections
        .first()
        .ok_or_else(|| ArenaError::fen(fen, "missing board layout"))?;
    let side_part = sections
        .get(1)
        .ok_or_else(|| ArenaError::fen(fen, "missing side-to-move field"))?;

    let mut position = Position {
        squares: parse_board(fen, board_part)?,
        white_to_move: *side_part == "w",
        ..Position::default()
    };

    let castling = sections.get(2).copied().unwrap_or("");
    position.white_castle_kingside = castling.contains('K');
    position.white_castle_queenside = castling.contains('Q');
    position.black_castle_kingside = castling.contains('k');
    position.black_castle_queenside = castling.contains('q');

    position.ep_file = sections
        .get(3)
        .and_then(|field| field.chars().next())
        .and_then(|ch| FILE_NAMES.find(ch))
        .map_or(0, |idx| idx as u8 + 1);

    position.fifty_move_ply_count = parse_counter(sections.get(4));
    position.fullmove_number = parse_counter(sections.get(5));

    Ok(position)
}

fn parse_board(fen: &str, board_part: &str) -> ArenaResult<[Option<Piece>; 64]> {
    let mut squares = [None; 64];
    let mut file = 0u32;
    let mut rank = 7i32;

    for ch in board_part.chars() {
        if ch == '/' {
            file = 0;
            rank -= 1;
        } else if let Some(empty) = ch.to_digit(10) {
            file += empty;
        } else {
            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| ArenaError::fen(fen, format!("invalid piece character '{ch}'")))?;
            if !(0..8).contains(&rank) || file >= 8 {
                return Err(ArenaError::fen(fen, format!("piece '{ch}' placed off the board")));
            }
            squares[square_of(file as u8, rank as u8) as usize] = Some(piece);
            file += 1;
        }
    }

    Ok(squares)
}

#[inline]
fn parse_counter(field: Option<&&str>) -> u32 {
    field.and_then(|text| text.parse::<u32>().ok()).unwrap_or(0)
}
