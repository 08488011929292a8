//! Board to FEN text, standard and fogged.
//!
//! The standard encoder emits the usual six fields. The fogged encoder emits
//! only the board field, writing `?` for every square outside the given
//! visibility mask; fog squares are never folded into an empty-square run.

use serde::{Deserialize, Serialize};

use crate::codec::algebraic::coordinate_to_algebraic;
use crate::game_state::{chess_types::*, game_state::GameState};

/// When to write the en-passant target square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnPassantPolicy {
    /// Whenever a double step was just played.
    #[default]
    #[serde(rename = "always")]
    AlwaysInclude,
    /// Only when a pawn of the side to move stands ready to capture.
    #[serde(rename = "capturable")]
    OnlyIfCapturable,
}

pub fn encode_fen(board: &GameState, policy: EnPassantPolicy) -> String {
    let side_to_move = if board.is_white_to_move() { "w" } else { "b" };
    format!(
        "{} {} {} {} {} {}",
        encode_board_field(board, |_| true),
        side_to_move,
        castling_field(board.castling_rights),
        en_passant_field(board, policy),
        board.halfmove_clock,
        board.fullmove_number()
    )
}

/// Board field only, with `?` on every square not set in `visible`.
pub fn encode_fogged_fen(board: &GameState, visible: Bitboard) -> String {
    encode_board_field(board, |sq| visible & (1u64 << sq) != 0)
}

fn encode_board_field(board: &GameState, is_visible: impl Fn(Square) -> bool) -> String {
    let mut out = String::with_capacity(72);

    for rank in (0..8u8).rev() {
        let mut empty_run = 0u8;

        for file in 0..8u8 {
            let sq = square_of(file, rank);
            let glyph = if !is_visible(sq) {
                Some('?')
            } else {
                board.piece_at(sq).map(Piece::fen_char)
            };

            match glyph {
                Some(ch) => {
                    if empty_run > 0 {
                        out.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    out.push(ch);
                }
                None => empty_run += 1,
            }
        }

        if empty_run > 0 {
            out.push(char::from(b'0' + empty_run));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out
}

/// Letters for the rights held; `-` iff none were written.
fn castling_field(rights: CastlingRights) -> String {
    let mut out = String::with_capacity(4);
    for (flag, letter) in [
        (CASTLE_WHITE_KINGSIDE, 'K'),
        (CASTLE_WHITE_QUEENSIDE, 'Q'),
        (CASTLE_BLACK_KINGSIDE, 'k'),
        (CASTLE_BLACK_QUEENSIDE, 'q'),
    ] {
        if rights & flag != 0 {
            out.push(letter);
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

fn en_passant_field(board: &GameState, policy: EnPassantPolicy) -> String {
    let Some(target) = board.en_passant_square else {
        return "-".to_owned();
    };

    let ep_file = file_of(target);
    let ep_rank = if board.is_white_to_move() { 5 } else { 2 };
    let include = match policy {
        EnPassantPolicy::AlwaysInclude => true,
        EnPassantPolicy::OnlyIfCapturable => en_passant_can_be_captured(board, ep_file, ep_rank),
    };

    if include {
        coordinate_to_algebraic(ep_file, ep_rank)
    } else {
        "-".to_owned()
    }
}

/// A pawn of the side to move on either square diagonally behind the target.
fn en_passant_can_be_captured(board: &GameState, ep_file: u8, ep_rank: u8) -> bool {
    let capture_rank = if board.is_white_to_move() {
        ep_rank.checked_sub(1)
    } else {
        ep_rank.checked_add(1).filter(|r| *r < 8)
    };
    let Some(capture_rank) = capture_rank else {
        return false;
    };
    let friendly_pawn = Piece::new(PieceKind::Pawn, board.side_to_move);

    [ep_file.checked_sub(1), ep_file.checked_add(1).filter(|f| *f < 8)]
        .into_iter()
        .flatten()
        .any(|file| board.piece_at(square_of(file, capture_rank)) == Some(friendly_pawn))
}

#[cfg(test)]
mod tests {
    use super::{encode_fen, encode_fogged_fen, EnPassantPolicy};
    use crate::codec::fen_parser::decode_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;
    use crate::moves::chess_move::ChessMove;

    fn play(board: &mut GameState, moves: &[&str]) {
        for uci in moves {
            let mv = ChessMove::from_uci(uci, board).expect("move should parse");
            board.make_move(mv).expect("move should apply");
        }
    }

    #[test]
    fn starting_position_encodes_byte_for_byte() {
        let board = GameState::new_game();
        assert_eq!(
            encode_fen(&board, EnPassantPolicy::AlwaysInclude),
            STARTING_POSITION_FEN
        );
    }

    #[test]
    fn open_game_encodes_board_side_and_en_passant() {
        let mut board = GameState::new_game();
        play(&mut board, &["e2e4", "e7e5"]);

        let fen = encode_fen(&board, EnPassantPolicy::AlwaysInclude);
        let fields: Vec<&str> = fen.split(' ').collect();
        assert_eq!(fields[0], "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR");
        assert_eq!(fields[1], "w");
        assert_eq!(fen, "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2");

        assert_eq!(
            encode_fen(&board, EnPassantPolicy::OnlyIfCapturable),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn capturable_policy_keeps_target_when_a_pawn_can_take() {
        let mut board = GameState::new_game();
        play(&mut board, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(
            encode_fen(&board, EnPassantPolicy::OnlyIfCapturable),
            "rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
        );
    }

    #[test]
    fn capturable_check_is_bounds_safe_on_edge_files() {
        let board = GameState::from_fen("4k3/8/8/pP6/8/8/8/4K3 w - a6 0 1").expect("FEN");
        assert_eq!(
            encode_fen(&board, EnPassantPolicy::OnlyIfCapturable),
            "4k3/8/8/pP6/8/8/8/4K3 w - a6 0 1"
        );
        let board = GameState::from_fen("4k3/8/8/7p/8/8/8/4K3 w - h6 0 1").expect("FEN");
        assert_eq!(
            encode_fen(&board, EnPassantPolicy::OnlyIfCapturable),
            "4k3/8/8/7p/8/8/8/4K3 w - - 0 1"
        );
    }

    #[test]
    fn castling_field_is_dash_only_without_rights() {
        let board = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 12 40").expect("FEN");
        assert_eq!(
            encode_fen(&board, EnPassantPolicy::AlwaysInclude),
            "4k3/8/8/8/8/8/8/4K3 b - - 12 40"
        );
        let board = GameState::from_fen("r3k3/8/8/8/8/8/8/4K2R w Kq - 0 1").expect("FEN");
        assert!(encode_fen(&board, EnPassantPolicy::AlwaysInclude).contains(" w Kq - "));
    }

    #[test]
    fn decode_of_encode_reproduces_position() {
        for fen in [
            STARTING_POSITION_FEN,
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6",
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
            "8/8/8/8/8/8/8/4K2k b - - 99 120",
        ] {
            let position = decode_fen(fen).expect("fixture should decode");
            let encoded = encode_fen(&GameState::from_position(&position), EnPassantPolicy::AlwaysInclude);
            assert_eq!(encoded, fen);
            assert_eq!(decode_fen(&encoded).expect("re-decode"), position);
        }
    }

    #[test]
    fn fog_squares_are_never_run_length_encoded() {
        let board = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN");
        // e1 king plus d1, d2, e2, f2, f1.
        let visible: Bitboard = [4u8, 3, 11, 12, 13, 5]
            .iter()
            .fold(0, |acc, sq| acc | (1u64 << sq));

        let fogged = encode_fogged_fen(&board, visible);
        assert_eq!(
            fogged,
            "????????/????????/????????/????????/????????/????????/???3??/???1K1??"
        );
        assert_eq!(fogged, encode_fogged_fen(&board, visible));
        assert!(!fogged.contains('8'));
    }

    #[test]
    fn fully_visible_fog_matches_standard_board_field() {
        let board = GameState::new_game();
        let fogged = encode_fogged_fen(&board, u64::MAX);
        assert_eq!(fogged, STARTING_POSITION_FEN.split(' ').next().unwrap_or_default());
    }
}
