//! UCI long algebraic move notation (`e2e4`, `e7e8q`).
//!
//! Parsing infers the special-move tag from the board so the resulting value
//! compares equal to the generator's move when the move is legal.

use crate::codec::algebraic::{algebraic_to_square, square_to_algebraic};
use crate::errors::{ArenaError, ArenaResult};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::chess_move::{ChessMove, MoveFlag};

pub fn move_to_long_algebraic(mv: ChessMove) -> String {
    let mut out = String::with_capacity(5);
    out.push_str(&square_to_algebraic(mv.from()));
    out.push_str(&square_to_algebraic(mv.to()));
    if let Some(promo) = mv.promotion_piece() {
        out.push(promo.letter().to_ascii_lowercase());
    }
    out
}

pub fn long_algebraic_to_move(text: &str, board: &GameState) -> ArenaResult<ChessMove> {
    let text = text.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ArenaError::Notation(format!("invalid long algebraic move: {text}")));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;

    let moving = board
        .piece_at(from)
        .ok_or_else(|| ArenaError::Notation(format!("no piece on {}", &text[0..2])))?;

    let flag = if let Some(promo) = text.chars().nth(4) {
        let promotion_flag = PieceKind::from_letter(promo)
            .and_then(MoveFlag::for_promotion)
            .ok_or_else(|| ArenaError::Notation(format!("invalid promotion piece: {promo}")))?;
        if moving.kind != PieceKind::Pawn {
            return Err(ArenaError::Notation("only pawns may promote".to_owned()));
        }
        promotion_flag
    } else {
        match moving.kind {
            PieceKind::King if from.abs_diff(to) == 2 && file_of(from) == 4 => MoveFlag::Castle,
            PieceKind::Pawn if from.abs_diff(to) == 16 => MoveFlag::PawnTwoUp,
            PieceKind::Pawn
                if file_of(from) != file_of(to)
                    && board.piece_at(to).is_none()
                    && board.en_passant_square == Some(to) =>
            {
                MoveFlag::EnPassantCapture
            }
            _ => MoveFlag::None,
        }
    };

    Ok(ChessMove::new(from, to, flag))
}
