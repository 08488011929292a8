use crate::errors::{ArenaError, ArenaResult};
use crate::game_state::position_key::compute_position_key;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::chess_move::{ChessMove, MoveFlag};

/// Return the board after `mv`. Counters, rights and the position key are
/// updated; the repetition history is left to the caller.
pub fn apply_move(board: &GameState, mv: ChessMove) -> ArenaResult<GameState> {
    let from = mv.from();
    let to = mv.to();
    let from_mask = 1u64 << from;
    let to_mask = 1u64 << to;

    let mover = board.side_to_move;
    let enemy = mover.opposite();

    let moved = board
        .piece_at(from)
        .filter(|p| p.color == mover)
        .ok_or_else(|| {
            ArenaError::MoveApplication(format!("no {mover:?} piece on origin square {from}"))
        })?
        .kind;

    let mut next = board.clone();
    next.pieces[mover.index()][moved.index()] &= !from_mask;

    let mut captured = false;
    if mv.flag() == MoveFlag::EnPassantCapture {
        let victim = match mover {
            Color::White => to.checked_sub(8),
            Color::Black => to.checked_add(8),
        }
        .ok_or_else(|| ArenaError::MoveApplication("bad en-passant target".to_owned()))?;
        next.pieces[enemy.index()][PieceKind::Pawn.index()] &= !(1u64 << victim);
        captured = true;
    } else if board.occupancy_by_color[enemy.index()] & to_mask != 0 {
        for kind in ALL_PIECE_KINDS {
            next.pieces[enemy.index()][kind.index()] &= !to_mask;
        }
        captured = true;
    }

    let placed = mv.promotion_piece().unwrap_or(moved);
    next.pieces[mover.index()][placed.index()] |= to_mask;

    if mv.flag() == MoveFlag::Castle {
        let (rook_from, rook_to) = match (from, to) {
            (4, 6) => (7, 5),
            (4, 2) => (0, 3),
            (60, 62) => (63, 61),
            (60, 58) => (56, 59),
            _ => {
                return Err(ArenaError::MoveApplication(format!(
                    "castle tag on non-castling squares {from}->{to}"
                )))
            }
        };
        let rooks = &mut next.pieces[mover.index()][PieceKind::Rook.index()];
        *rooks &= !(1u64 << rook_from);
        *rooks |= 1u64 << rook_to;
    }

    update_castling_rights(&mut next, mover, from, to, moved);

    next.en_passant_square = if mv.flag() == MoveFlag::PawnTwoUp {
        Some((from + to) / 2)
    } else {
        None
    };

    if moved == PieceKind::Pawn || captured {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }

    next.side_to_move = enemy;
    next.ply_count = next.ply_count.saturating_add(1);
    next.recalc_occupancy();
    next.position_key = compute_position_key(&next);

    Ok(next)
}

fn update_castling_rights(
    board: &mut GameState,
    mover: Color,
    from: Square,
    to: Square,
    moved: PieceKind,
) {
    if moved == PieceKind::King {
        board.castling_rights &= match mover {
            Color::White => !(CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE),
            Color::Black => !(CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE),
        };
    }

    // Moving a rook off, or capturing onto, a corner revokes that corner's right.
    for sq in [from, to] {
        board.castling_rights &= match sq {
            0 => !CASTLE_WHITE_QUEENSIDE,
            7 => !CASTLE_WHITE_KINGSIDE,
            56 => !CASTLE_BLACK_QUEENSIDE,
            63 => !CASTLE_BLACK_KINGSIDE,
            _ => !0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::apply_move;
    use crate::game_state::chess_types::*;
    use crate::moves::chess_move::{ChessMove, MoveFlag};

    #[test]
    fn double_push_sets_en_passant_square_and_resets_clock() {
        let board = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 5 10").expect("FEN should parse");
        let next = apply_move(&board, ChessMove::new(12, 28, MoveFlag::PawnTwoUp))
            .expect("move should apply");
        assert_eq!(next.en_passant_square, Some(20));
        assert_eq!(next.halfmove_clock, 0);
        assert_eq!(next.side_to_move, Color::Black);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let board = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let next = apply_move(&board, ChessMove::new(36, 43, MoveFlag::EnPassantCapture))
            .expect("move should apply");
        assert_eq!(next.piece_at(35), None);
        assert_eq!(
            next.piece_at(43),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn castling_moves_rook_and_drops_rights() {
        let board = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let next = apply_move(&board, ChessMove::new(4, 6, MoveFlag::Castle)).expect("castle");
        assert_eq!(next.piece_at(5), Some(Piece::new(PieceKind::Rook, Color::White)));
        assert_eq!(next.piece_at(7), None);
        assert_eq!(
            next.castling_rights,
            CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE
        );
    }

    #[test]
    fn moving_from_an_empty_square_is_rejected() {
        let board = GameState::new_game();
        assert!(apply_move(&board, ChessMove::new(27, 35, MoveFlag::None)).is_err());
    }
}
