//! Decoded FEN position.
//!
//! A `Position` is a plain snapshot: 64 squares, side to move, the four
//! castling flags, the en-passant file and the two counters. A fresh value is
//! built for each board state; nothing mutates one after construction.

use crate::game_state::chess_types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Indexed `0 = a1 ..= 63 = h8`.
    pub squares: [Option<Piece>; 64],
    pub white_to_move: bool,
    pub white_castle_kingside: bool,
    pub white_castle_queenside: bool,
    pub black_castle_kingside: bool,
    pub black_castle_queenside: bool,
    /// `0` = none, `1..=8` = files a..h.
    pub ep_file: u8,
    pub fifty_move_ply_count: u32,
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            squares: [None; 64],
            white_to_move: true,
            white_castle_kingside: false,
            white_castle_queenside: false,
            black_castle_kingside: false,
            black_castle_queenside: false,
            ep_file: 0,
            fifty_move_ply_count: 0,
            fullmove_number: 0,
        }
    }
}

impl Position {
    /// Snapshot a live board.
    pub fn from_board(board: &GameState) -> Self {
        let mut squares = [None; 64];
        for (sq, slot) in squares.iter_mut().enumerate() {
            *slot = board.piece_at(sq as Square);
        }

        Self {
            squares,
            white_to_move: board.is_white_to_move(),
            white_castle_kingside: board.castling_rights & CASTLE_WHITE_KINGSIDE != 0,
            white_castle_queenside: board.castling_rights & CASTLE_WHITE_QUEENSIDE != 0,
            black_castle_kingside: board.castling_rights & CASTLE_BLACK_KINGSIDE != 0,
            black_castle_queenside: board.castling_rights & CASTLE_BLACK_QUEENSIDE != 0,
            ep_file: board.en_passant_square.map_or(0, |sq| file_of(sq) + 1),
            fifty_move_ply_count: board.halfmove_clock,
            fullmove_number: board.fullmove_number(),
        }
    }

    /// Moves already completed before this position: one less than the
    /// full-move number, never negative.
    #[inline]
    pub fn move_count(&self) -> u32 {
        self.fullmove_number.saturating_sub(1)
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|sq| sq.is_some()).count()
    }

    pub fn has_castling_rights(&self) -> bool {
        self.white_castle_kingside
            || self.white_castle_queenside
            || self.black_castle_kingside
            || self.black_castle_queenside
    }
}

#[cfg(test)]
mod tests {
    use super::Position;
    use crate::game_state::chess_types::{Color, GameState, Piece, PieceKind};

    #[test]
    fn snapshot_of_new_game_matches_start_layout() {
        let position = Position::from_board(&GameState::new_game());
        assert_eq!(position.piece_count(), 32);
        assert_eq!(
            position.squares[4],
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            position.squares[59],
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert!(position.has_castling_rights());
        assert_eq!(position.move_count(), 0);
    }
}
