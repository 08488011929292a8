//! Square-name conversions (`e4` <-> square index).

use crate::errors::{ArenaError, ArenaResult};
use crate::game_state::chess_types::{square_of, Square};

pub fn algebraic_to_square(name: &str) -> ArenaResult<Square> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return Err(ArenaError::Notation(format!("invalid square name: {name}")));
    }

    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) {
        return Err(ArenaError::Notation(format!("invalid file: {}", file as char)));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(ArenaError::Notation(format!("invalid rank: {}", rank as char)));
    }

    Ok(square_of(file - b'a', rank - b'1'))
}

/// Name of `square`; callers pass indices below 64.
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    let file = char::from(b'a' + square % 8);
    let rank = char::from(b'1' + (square / 8) % 8);
    format!("{file}{rank}")
}

#[inline]
pub fn coordinate_to_algebraic(file: u8, rank: u8) -> String {
    square_to_algebraic(square_of(file, rank))
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, coordinate_to_algebraic, square_to_algebraic};

    #[test]
    fn corner_and_centre_squares_convert_both_ways() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 63);
        assert_eq!(algebraic_to_square("e4").expect("e4 should parse"), 28);
        assert_eq!(square_to_algebraic(63), "h8");
        assert_eq!(coordinate_to_algebraic(4, 5), "e6");
    }

    #[test]
    fn off_board_names_are_rejected() {
        assert!(algebraic_to_square("i1").is_err());
        assert!(algebraic_to_square("a9").is_err());
        assert!(algebraic_to_square("e").is_err());
    }
}
