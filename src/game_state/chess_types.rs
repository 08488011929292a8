//! Core board vocabulary shared by the codec, move generation and orchestration.
//!
//! Colors and piece kinds are kept separate so bitboards can be indexed
//! `[color][piece_kind]`; `Piece` pairs them for the square-by-square views.

pub use crate::game_state::game_state::GameState;
pub use crate::game_state::position::Position;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub const fn is_white(self) -> bool {
        matches!(self, Color::White)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

pub const ALL_PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

impl PieceKind {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Uppercase FEN letter for this kind.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    #[inline]
    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A colored piece standing on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    #[inline]
    pub fn fen_char(self) -> char {
        let upper = self.kind.letter();
        match self.color {
            Color::White => upper,
            Color::Black => upper.to_ascii_lowercase(),
        }
    }

    #[inline]
    pub fn from_fen_char(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else if ch.is_ascii_lowercase() {
            Color::Black
        } else {
            return None;
        };
        PieceKind::from_letter(ch).map(|kind| Piece::new(kind, color))
    }
}

pub const CASTLE_WHITE_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_WHITE_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_BLACK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_BLACK_QUEENSIDE: CastlingRights = 1 << 3;
pub type CastlingRights = u8;

/// Board square index (`0 = a1 ..= 63 = h8`).
pub type Square = u8;

/// Set of squares, one bit per square index.
pub type Bitboard = u64;

#[inline]
pub const fn square_of(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square / 8
}
