use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
};

use paste::paste;
use seq_macro::seq;
use thiserror::Error;

/// A square on the chessboard.
///
/// Squares are numbered 0-63 by increasing file then rank: 0 is a1, 1 is b1,
/// 7 is h1, 8 is a2, and 63 is h8.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Starting square of the white queenside rook.
    pub const WHITE_QUEENSIDE_ROOK: Self = Self::new_unchecked(0, 0);
    /// Starting square of the white kingside rook.
    pub const WHITE_KINGSIDE_ROOK: Self = Self::new_unchecked(0, 7);
    /// Starting square of the black queenside rook.
    pub const BLACK_QUEENSIDE_ROOK: Self = Self::new_unchecked(7, 0);
    /// Starting square of the black kingside rook.
    pub const BLACK_KINGSIDE_ROOK: Self = Self::new_unchecked(7, 7);

    /// Constructs a [`Square`] from a rank and file, both numbered 0-7 (rank
    /// 0 is rank 1, file 0 is the A file). Returns [`None`] if either is out
    /// of range.
    pub const fn new(rank: u8, file: u8) -> Option<Self> {
        if rank >= 8 || file >= 8 {
            None
        } else {
            Some(Self(8 * rank + file))
        }
    }

    /// Constructs a [`Square`] from a rank and file without range checks.
    ///
    /// The result is truncated into 0-63, so no invalid square can be
    /// produced, but out-of-range inputs will not yield the square you
    /// wanted.
    pub const fn new_unchecked(rank: u8, file: u8) -> Self {
        Self(rank.wrapping_mul(8).wrapping_add(file) % 64)
    }

    /// Constructs a [`Square`] from an index, 0 being a1 and 63 being h8.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 64 {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// As [`Self::from_index`], but truncates out-of-range values into 0-63.
    pub const fn from_index_unchecked(index: usize) -> Self {
        Self((index % 64) as u8)
    }

    /// Constructs a [`Square`] from a [`u8`], truncating into 0-63.
    pub const fn from_u8_unchecked(value: u8) -> Self {
        Self(value % 64)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The rank of this square, 0-7 (0 is rank 1).
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// The file of this square, 0-7 (0 is the A file).
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Iterates over all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }

    /// Adds an offset to this square; +8 is one rank up, +1 one file east.
    ///
    /// No wrap checking is done, but the result is truncated into 0-63 so it
    /// is always a valid square.
    pub const fn offset(self, offset: i8) -> Self {
        Self::from_u8_unchecked((self.0 as i8).wrapping_add(offset) as u8)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char((self.file() + b'a') as char)?;
        f.write_char((self.rank() + b'1') as char)
    }
}

impl Debug for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{}{}",
            (self.file() + b'A') as char,
            (self.rank() + b'1') as char
        ))
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("invalid square")]
pub struct ParseSquareError;

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file = chars.next().ok_or(ParseSquareError)?;
        let rank = chars.next().ok_or(ParseSquareError)?;
        if chars.next().is_some() {
            return Err(ParseSquareError);
        }

        let file = (file as i32) - ('a' as i32);
        let rank = (rank as i32) - ('1' as i32);
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Ok(Square::new_unchecked(rank as u8, file as u8))
        } else {
            Err(ParseSquareError)
        }
    }
}

/// Named constants for every square, `Square::A1` through `Square::H8`.
#[allow(clippy::eq_op, clippy::char_lit_as_u8)]
impl Square {
    seq!(RANK in 1..=8 {
        seq!(FILE in 'A'..='H' {
            paste! {
                pub const [<FILE RANK>]: Square = Square::new_unchecked(RANK - 1, FILE as u8 - b'A');
            }
        });
    });
}
