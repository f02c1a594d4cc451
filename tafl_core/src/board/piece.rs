use std::fmt::{Debug, Display};
use std::num::NonZeroU8;

use num_derive::{FromPrimitive, ToPrimitive};

/// The kind of a piece, without its colour.
///
/// Kinds are assigned 1-6 so they fit in 3 bits while leaving 0 free, which
/// lets Rust use 0 as the niche for [`Option<Piece>`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    pub const fn white(self) -> Piece {
        Piece::white(self)
    }

    pub const fn black(self) -> Piece {
        Piece::black(self)
    }

    pub const fn with_color(self, color: Color) -> Piece {
        Piece::new(color, self)
    }

    /// FEN character for the white piece of this kind.
    pub const fn as_uppercase_char(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// FEN character for the black piece of this kind.
    pub const fn as_lowercase_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

/// A player in a chess game.
///
/// White is 0 and black is 8 so that a [`Piece`] is just the bitwise-or of
/// its [`Color`] and [`PieceType`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    White = 0,
    Black = 8,
}

impl Color {
    pub const fn is_white(self) -> bool {
        matches!(self, Color::White)
    }

    pub const fn is_black(self) -> bool {
        !self.is_white()
    }

    pub const fn flip(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// A coloured piece.
///
/// Represented as a 4-bit value, the bitwise-or of [`Color`] and
/// [`PieceType`]. Since a [`PieceType`] is never 0, [`Option<Piece>`] is a
/// single byte.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Piece(NonZeroU8);

impl Piece {
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        // A PieceType is never 0, so neither is the combined nibble.
        match NonZeroU8::new(color as u8 | piece_type as u8) {
            Some(value) => Self(value),
            None => unreachable!(),
        }
    }

    pub const fn white(piece_type: PieceType) -> Self {
        Self::new(Color::White, piece_type)
    }

    pub const fn black(piece_type: PieceType) -> Self {
        Self::new(Color::Black, piece_type)
    }

    pub const fn pawn(color: Color) -> Self {
        Self::new(color, PieceType::Pawn)
    }

    pub const fn knight(color: Color) -> Self {
        Self::new(color, PieceType::Knight)
    }

    pub const fn bishop(color: Color) -> Self {
        Self::new(color, PieceType::Bishop)
    }

    pub const fn rook(color: Color) -> Self {
        Self::new(color, PieceType::Rook)
    }

    pub const fn queen(color: Color) -> Self {
        Self::new(color, PieceType::Queen)
    }

    pub const fn king(color: Color) -> Self {
        Self::new(color, PieceType::King)
    }

    /// Reconstructs a [`Piece`] from its nibble value, if valid.
    pub const fn try_from_u8(value: u8) -> Option<Self> {
        let kind = value & 0b0111;
        if kind >= 1 && kind <= 6 && value & !0b1111 == 0 {
            match NonZeroU8::new(value) {
                Some(value) => Some(Self(value)),
                None => None,
            }
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0.get()
    }

    pub const fn color(self) -> Color {
        if self.0.get() & 0b1000 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub const fn piece_type(self) -> PieceType {
        match self.0.get() & 0b0111 {
            1 => PieceType::Pawn,
            2 => PieceType::Knight,
            3 => PieceType::Bishop,
            4 => PieceType::Rook,
            5 => PieceType::Queen,
            6 => PieceType::King,
            _ => unreachable!(),
        }
    }

    pub const fn is_white(self) -> bool {
        self.color().is_white()
    }

    pub const fn is_black(self) -> bool {
        self.color().is_black()
    }

    pub const fn as_fen_char(self) -> char {
        match self.color() {
            Color::White => self.piece_type().as_uppercase_char(),
            Color::Black => self.piece_type().as_lowercase_char(),
        }
    }

    pub fn try_from_fen_char(c: char) -> Option<Self> {
        let piece_type = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };

        Some(if c.is_ascii_uppercase() {
            piece_type.white()
        } else {
            piece_type.black()
        })
    }
}

/// Convenience constants for every coloured piece.
impl Piece {
    pub const WHITE_PAWN: Self = Self::white(PieceType::Pawn);
    pub const WHITE_KNIGHT: Self = Self::white(PieceType::Knight);
    pub const WHITE_BISHOP: Self = Self::white(PieceType::Bishop);
    pub const WHITE_ROOK: Self = Self::white(PieceType::Rook);
    pub const WHITE_QUEEN: Self = Self::white(PieceType::Queen);
    pub const WHITE_KING: Self = Self::white(PieceType::King);

    pub const BLACK_PAWN: Self = Self::black(PieceType::Pawn);
    pub const BLACK_KNIGHT: Self = Self::black(PieceType::Knight);
    pub const BLACK_BISHOP: Self = Self::black(PieceType::Bishop);
    pub const BLACK_ROOK: Self = Self::black(PieceType::Rook);
    pub const BLACK_QUEEN: Self = Self::black(PieceType::Queen);
    pub const BLACK_KING: Self = Self::black(PieceType::King);
}

impl Debug for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?} {:?}", self.color(), self.piece_type()))
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.as_fen_char()))
    }
}
