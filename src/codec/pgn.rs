//! PGN export of finished games.
//!
//! Movetext is written in long algebraic (UCI) notation and replayed from the
//! recorded starting FEN so every move is checked against the board it was
//! played on.

use std::collections::BTreeMap;

use chrono::Local;

use crate::codec::long_algebraic::move_to_long_algebraic;
use crate::errors::{ArenaError, ArenaResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::game_state::GameState;
use crate::moves::chess_move::ChessMove;

/// Names and labels for the seven-tag roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnTags {
    pub event: String,
    pub round: u32,
    pub white: String,
    pub black: String,
    pub result: String,
}

pub fn write_pgn(start_fen: &str, moves: &[ChessMove], tags: &PgnTags) -> ArenaResult<String> {
    let mut headers = BTreeMap::<String, String>::new();
    headers.insert("Event".to_owned(), tags.event.clone());
    headers.insert("Site".to_owned(), "Local".to_owned());
    headers.insert("Date".to_owned(), Local::now().format("%Y.%m.%d").to_string());
    headers.insert("Round".to_owned(), tags.round.to_string());
    headers.insert("White".to_owned(), tags.white.clone());
    headers.insert("Black".to_owned(), tags.black.clone());
    headers.insert("Result".to_owned(), normalize_result(&tags.result).to_owned());

    if start_fen != STARTING_POSITION_FEN {
        headers.insert("SetUp".to_owned(), "1".to_owned());
        headers.insert("FEN".to_owned(), start_fen.to_owned());
    }

    write_pgn_with_headers(start_fen, moves, &headers)
}

pub fn write_pgn_with_headers(
    start_fen: &str,
    moves: &[ChessMove],
    headers: &BTreeMap<String, String>,
) -> ArenaResult<String> {
    let mut out = String::new();
    for (key, value) in headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut board = GameState::from_fen(start_fen)?;
    let first_fullmove = board.fullmove_number() as usize;
    let black_first = !board.is_white_to_move();

    let mut parts = Vec::<String>::with_capacity(moves.len() + 1);
    for (idx, mv) in moves.iter().enumerate() {
        let lan = move_to_long_algebraic(*mv);
        let ply = idx + usize::from(black_first);
        let number = first_fullmove + ply / 2;
        if ply % 2 == 0 {
            parts.push(format!("{number}. {lan}"));
        } else if idx == 0 {
            parts.push(format!("{number}... {lan}"));
        } else {
            parts.push(lan);
        }
        board
            .make_move(*mv)
            .map_err(|e| ArenaError::Pgn(format!("move {} does not replay: {e}", idx + 1)))?;
    }

    let result = headers
        .get("Result")
        .map(|x| normalize_result(x))
        .unwrap_or("*");
    parts.push(result.to_owned());
    out.push_str(&parts.join(" "));
    out.push('\n');

    Ok(out)
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

fn normalize_result(result: &str) -> &str {
    if is_result_token(result) {
        result
    } else {
        "*"
    }
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('"', "\\\"")
}
