use std::ops::{Index, IndexMut, Range};

use super::{Bitboard, Color, Piece, PieceType, Square};

/// Piece placement as bitboards.
///
/// Holds one bitboard per coloured piece plus an aggregate board per colour.
/// The slot index of a piece board is the piece's nibble value, so the
/// boards can be accessed by indexing with a [`Piece`] or a [`Color`]:
///
/// - 0: all white pieces
/// - 1-6: white pawns, knights, bishops, rooks, queens, kings
/// - 8: all black pieces
/// - 9-14: black piece boards
///
/// Slots 7 and 15 are unused.
///
/// At most one piece board has any given square set, the colour aggregates
/// equal the union of their six piece boards, and [`Self::occupied`] is the
/// union of the two aggregates. The mutation primitives below preserve all
/// three properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardRepr {
    boards: [Bitboard; 15],
}

impl BoardRepr {
    const WHITE_RANGE: Range<usize> = 1..7;
    const BLACK_RANGE: Range<usize> = 9..15;

    /// Builds a [`BoardRepr`] from a square-ordered slice (index 0 is a1,
    /// index 63 is h8). Missing trailing squares are treated as empty and
    /// anything past index 63 is ignored.
    pub fn new(board: &[Option<Piece>]) -> Self {
        let mut repr = Self::default();

        for (i, &piece) in board.iter().take(64).enumerate() {
            if let Some(piece) = piece {
                repr.add(piece, Square::from_index_unchecked(i));
            }
        }

        repr
    }

    /// Puts a piece on an empty square.
    pub fn add(&mut self, piece: Piece, square: Square) {
        let mask = Bitboard::from_square(square);
        self[piece] |= mask;
        self[piece.color()] |= mask;
    }

    /// Removes a piece from the square it occupies.
    pub fn remove(&mut self, piece: Piece, square: Square) {
        let mask = Bitboard::from_square(square);
        self[piece] ^= mask;
        self[piece.color()] ^= mask;
    }

    /// Moves a piece between two squares. The destination must be empty;
    /// captures remove the victim first.
    ///
    /// Self-inverse: applying the same move with `from` and `to` swapped
    /// restores the previous placement.
    pub fn move_piece(&mut self, piece: Piece, from: Square, to: Square) {
        let from_to = Bitboard::from_square(from) ^ Bitboard::from_square(to);
        self[piece] ^= from_to;
        self[piece.color()] ^= from_to;
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let mask = Bitboard::from_square(square);

        for i in Self::WHITE_RANGE.chain(Self::BLACK_RANGE) {
            if (mask & self.boards[i]).has_piece() {
                return Piece::try_from_u8(i as u8);
            }
        }

        None
    }

    /// As [`Self::piece_at`], but only scans one colour's boards.
    pub fn piece_with_color_at(&self, color: Color, square: Square) -> Option<Piece> {
        self.piece_type_at(color, square)
            .map(|kind| kind.with_color(color))
    }

    /// The kind of the given colour's piece on a square, if any.
    pub fn piece_type_at(&self, color: Color, square: Square) -> Option<PieceType> {
        let mask = Bitboard::from_square(square);

        for kind in PieceType::ALL {
            if (mask & self[kind.with_color(color)]).has_piece() {
                return Some(kind);
            }
        }

        None
    }

    /// The square of the given colour's king.
    ///
    /// Panics if that king is missing; every position this crate operates on
    /// has exactly one king per side.
    pub fn king_square(&self, color: Color) -> Square {
        self[Piece::king(color)]
            .to_square()
            .unwrap_or_else(|| panic!("no {color:?} king on the board"))
    }

    pub fn occupied(&self) -> Bitboard {
        self[Color::White] | self[Color::Black]
    }

    pub fn empty(&self) -> Bitboard {
        !self.occupied()
    }

    /// Iterates over every piece on the board with its square, in no
    /// particular square order.
    pub fn pieces(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        Self::WHITE_RANGE
            .chain(Self::BLACK_RANGE)
            .flat_map(move |i| {
                let piece = Piece::try_from_u8(i as u8).unwrap();
                self.boards[i]
                    .squares()
                    .map(move |square| (piece, square))
            })
    }
}

impl Index<Piece> for BoardRepr {
    type Output = Bitboard;

    fn index(&self, index: Piece) -> &Self::Output {
        &self.boards[index.get() as usize]
    }
}

impl Index<Color> for BoardRepr {
    type Output = Bitboard;

    fn index(&self, index: Color) -> &Self::Output {
        &self.boards[index as usize]
    }
}

impl IndexMut<Piece> for BoardRepr {
    fn index_mut(&mut self, index: Piece) -> &mut Self::Output {
        &mut self.boards[index.get() as usize]
    }
}

impl IndexMut<Color> for BoardRepr {
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        &mut self.boards[index as usize]
    }
}
