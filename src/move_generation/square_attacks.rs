use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};

#[inline]
pub fn king_square(board: &GameState, color: Color) -> Option<Square> {
    let kings = board.pieces[color.index()][PieceKind::King.index()];
    if kings == 0 {
        None
    } else {
        Some(kings.trailing_zeros() as Square)
    }
}

#[inline]
pub fn is_king_in_check(board: &GameState, color: Color) -> bool {
    let Some(king_sq) = king_square(board, color) else {
        return false;
    };
    is_square_attacked(board, king_sq, color.opposite())
}

pub fn is_square_attacked(board: &GameState, square: Square, attacker: Color) -> bool {
    let theirs = &board.pieces[attacker.index()];

    // A pawn of `attacker` hits `square` iff a pawn of the other color on
    // `square` would hit the pawn's square.
    if pawn_attacks(attacker.opposite(), square) & theirs[PieceKind::Pawn.index()] != 0 {
        return true;
    }
    if knight_attacks(square) & theirs[PieceKind::Knight.index()] != 0 {
        return true;
    }
    if king_attacks(square) & theirs[PieceKind::King.index()] != 0 {
        return true;
    }

    let diagonal = theirs[PieceKind::Bishop.index()] | theirs[PieceKind::Queen.index()];
    if bishop_attacks(square, board.occupancy_all) & diagonal != 0 {
        return true;
    }

    let straight = theirs[PieceKind::Rook.index()] | theirs[PieceKind::Queen.index()];
    rook_attacks(square, board.occupancy_all) & straight != 0
}

#[cfg(test)]
mod tests {
    use super::{is_king_in_check, is_square_attacked};
    use crate::game_state::chess_types::Color;
    use crate::game_state::game_state::GameState;

    #[test]
    fn rook_on_open_file_gives_check() {
        let board = GameState::from_fen("4k3/8/8/8/8/8/8/4RK2 b - - 0 1").expect("FEN should parse");
        assert!(is_king_in_check(&board, Color::Black));
        assert!(!is_king_in_check(&board, Color::White));
    }

    #[test]
    fn pawn_attack_direction_depends_on_color() {
        let board = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        // e2 pawn hits d3 and f3, not d4.
        assert!(is_square_attacked(&board, 19, Color::White));
        assert!(is_square_attacked(&board, 21, Color::White));
        assert!(!is_square_attacked(&board, 27, Color::White));
    }
}
