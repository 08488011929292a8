//! Every proposed move passes through here before it touches the board.
//!
//! A move is accepted iff the generator's legal list for the same position
//! contains the identical packed value. No fuzzy matching on origin and
//! destination alone.

use crate::game_state::game_state::GameState;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerator};
use crate::moves::chess_move::ChessMove;

pub fn is_legal(
    generator: &dyn MoveGenerator,
    board: &GameState,
    candidate: ChessMove,
) -> MoveGenResult<bool> {
    let legal = generator.legal_moves(board)?;
    Ok(legal.iter().any(|mv| mv.raw() == candidate.raw()))
}

#[cfg(test)]
mod tests {
    use super::is_legal;
    use crate::game_state::chess_rules::DEFAULT_MATCH_FENS;
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_generator::StandardMoveGenerator;
    use crate::move_generation::move_generator::MoveGenerator;
    use crate::moves::chess_move::{ChessMove, MoveFlag};

    #[test]
    fn every_generated_move_is_accepted() {
        for fen in DEFAULT_MATCH_FENS {
            let board = GameState::from_fen(fen).expect("FEN");
            for mv in StandardMoveGenerator.legal_moves(&board).expect("moves") {
                assert!(is_legal(&StandardMoveGenerator, &board, mv).expect("gate"));
            }
        }
    }

    #[test]
    fn same_squares_with_another_tag_are_rejected() {
        let board = GameState::new_game();
        let tagged = ChessMove::from_uci("e2e4", &board).expect("LAN");
        assert_eq!(tagged.flag(), MoveFlag::PawnTwoUp);

        let untagged = ChessMove::new(tagged.from(), tagged.to(), MoveFlag::None);
        assert!(is_legal(&StandardMoveGenerator, &board, tagged).expect("gate"));
        assert!(!is_legal(&StandardMoveGenerator, &board, untagged).expect("gate"));
    }

    #[test]
    fn moves_outside_the_list_are_rejected() {
        let board = GameState::new_game();
        let in_check = GameState::from_fen("4k3/8/8/8/8/8/4N3/4K2r w - - 0 1").expect("FEN");

        assert!(!is_legal(&StandardMoveGenerator, &board, ChessMove::NULL).expect("gate"));
        let leap = ChessMove::from_uci("e2e5", &board).expect("LAN");
        assert!(!is_legal(&StandardMoveGenerator, &board, leap).expect("gate"));
        let ignores_check = ChessMove::from_uci("e2c3", &in_check).expect("LAN");
        assert!(!is_legal(&StandardMoveGenerator, &in_check, ignores_check).expect("gate"));
    }
}
