//! Packed move value.
//!
//! Layout (16 bits): origin in bits 0..6, destination in bits 6..12, special
//! move tag in bits 12..16. Two moves are the same move iff their raw values
//! are equal; the legality gate relies on that.

use crate::errors::ArenaResult;
use crate::game_state::chess_types::{GameState, PieceKind, Square};

const FROM_MASK: u16 = 0b0000_0000_0011_1111;
const TO_SHIFT: u16 = 6;
const TO_MASK: u16 = 0b0000_1111_1100_0000;
const FLAG_SHIFT: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    None = 0,
    EnPassantCapture = 1,
    Castle = 2,
    PawnTwoUp = 3,
    PromoteToQueen = 4,
    PromoteToKnight = 5,
    PromoteToRook = 6,
    PromoteToBishop = 7,
}

impl MoveFlag {
    fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(MoveFlag::None),
            1 => Some(MoveFlag::EnPassantCapture),
            2 => Some(MoveFlag::Castle),
            3 => Some(MoveFlag::PawnTwoUp),
            4 => Some(MoveFlag::PromoteToQueen),
            5 => Some(MoveFlag::PromoteToKnight),
            6 => Some(MoveFlag::PromoteToRook),
            7 => Some(MoveFlag::PromoteToBishop),
            _ => None,
        }
    }

    pub fn for_promotion(kind: PieceKind) -> Option<Self> {
        match kind {
            PieceKind::Queen => Some(MoveFlag::PromoteToQueen),
            PieceKind::Knight => Some(MoveFlag::PromoteToKnight),
            PieceKind::Rook => Some(MoveFlag::PromoteToRook),
            PieceKind::Bishop => Some(MoveFlag::PromoteToBishop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChessMove(u16);

impl ChessMove {
    /// The all-zero value. Never produced by a generator (a1 to a1).
    pub const NULL: ChessMove = ChessMove(0);

    #[inline]
    pub fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        let raw = (u16::from(from) & FROM_MASK)
            | ((u16::from(to) << TO_SHIFT) & TO_MASK)
            | ((flag as u16) << FLAG_SHIFT);
        ChessMove(raw)
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        ChessMove(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn from(self) -> Square {
        (self.0 & FROM_MASK) as Square
    }

    #[inline]
    pub fn to(self) -> Square {
        ((self.0 & TO_MASK) >> TO_SHIFT) as Square
    }

    /// Special-move tag; unknown tag bits read as `None`.
    #[inline]
    pub fn flag(self) -> MoveFlag {
        MoveFlag::from_bits(self.0 >> FLAG_SHIFT).unwrap_or(MoveFlag::None)
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn promotion_piece(self) -> Option<PieceKind> {
        match self.flag() {
            MoveFlag::PromoteToQueen => Some(PieceKind::Queen),
            MoveFlag::PromoteToKnight => Some(PieceKind::Knight),
            MoveFlag::PromoteToRook => Some(PieceKind::Rook),
            MoveFlag::PromoteToBishop => Some(PieceKind::Bishop),
            _ => None,
        }
    }

    /// Parse UCI long algebraic text (`e2e4`, `e7e8q`) against `board`.
    pub fn from_uci(text: &str, board: &GameState) -> ArenaResult<Self> {
        crate::codec::long_algebraic::long_algebraic_to_move(text, board)
    }
}
