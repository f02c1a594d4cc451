//! Type-level colour dispatch.
//!
//! Threading a zero-sized side type through move generation monomorphizes
//! every routine per colour, so pawn directions, ranks and castle data are
//! resolved at compile time and the recursion never branches on the side to
//! move. Flipping perspective is `S::Opp`.

use crate::board::{
    Bitboard, Castling, Color, Piece, PieceType, Square, CASTLE_BLACK_KINGSIDE,
    CASTLE_BLACK_QUEENSIDE, CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};

pub trait Side {
    /// The opposing side.
    type Opp: Side;

    const COLOR: Color;
    const IS_WHITE: bool;

    /// Both castling rights of this side.
    const CASTLE_RIGHTS: Castling;
    const KINGSIDE_RIGHT: Castling;
    const QUEENSIDE_RIGHT: Castling;
    /// Castle codes indexing [`crate::board::CASTLES`].
    const KINGSIDE_CASTLE: usize;
    const QUEENSIDE_CASTLE: usize;
    const KINGSIDE_ROOK_HOME: Square;
    const QUEENSIDE_ROOK_HOME: Square;

    /// Rank this side's pawns start on.
    const PAWN_START: Bitboard;
    /// Rank from which this side's pawns promote on their next push.
    const PROMOTION_FROM: Bitboard;

    /// Lowest square index of the rank an enemy double-pushed pawn lands on,
    /// as seen by this side when it captures en passant.
    const EP_VICTIM_BASE: u8;
    /// Square offset of a single pawn push.
    const PUSH_OFFSET: i8;

    /// Squares attacked by this side's pawns.
    fn pawn_attacks(pawns: Bitboard) -> Bitboard;

    /// Pawns shifted one rank forward, ignoring blockers.
    fn pawn_push(pawns: Bitboard) -> Bitboard;

    /// Reachable double-push squares for the given pawns; both traversed
    /// squares must be empty.
    fn pawn_double_push(pawns: Bitboard, occupied: Bitboard) -> Bitboard {
        Self::pawn_push(Self::pawn_push(pawns) & !occupied) & !occupied
    }

    fn piece(kind: PieceType) -> Piece {
        Piece::new(Self::COLOR, kind)
    }
}

pub struct White;
pub struct Black;

impl Side for White {
    type Opp = Black;

    const COLOR: Color = Color::White;
    const IS_WHITE: bool = true;

    const CASTLE_RIGHTS: Castling = Castling::WHITE;
    const KINGSIDE_RIGHT: Castling = Castling::WHITE_KINGSIDE;
    const QUEENSIDE_RIGHT: Castling = Castling::WHITE_QUEENSIDE;
    const KINGSIDE_CASTLE: usize = CASTLE_WHITE_KINGSIDE;
    const QUEENSIDE_CASTLE: usize = CASTLE_WHITE_QUEENSIDE;
    const KINGSIDE_ROOK_HOME: Square = Square::WHITE_KINGSIDE_ROOK;
    const QUEENSIDE_ROOK_HOME: Square = Square::WHITE_QUEENSIDE_ROOK;

    const PAWN_START: Bitboard = Bitboard::RANK_2;
    const PROMOTION_FROM: Bitboard = Bitboard::RANK_7;

    // White captures en passant on rank 6, against a pawn on rank 5.
    const EP_VICTIM_BASE: u8 = 32;
    const PUSH_OFFSET: i8 = 8;

    #[inline]
    fn pawn_attacks(pawns: Bitboard) -> Bitboard {
        pawns.step_north_east() | pawns.step_north_west()
    }

    #[inline]
    fn pawn_push(pawns: Bitboard) -> Bitboard {
        pawns.step_north()
    }
}

impl Side for Black {
    type Opp = White;

    const COLOR: Color = Color::Black;
    const IS_WHITE: bool = false;

    const CASTLE_RIGHTS: Castling = Castling::BLACK;
    const KINGSIDE_RIGHT: Castling = Castling::BLACK_KINGSIDE;
    const QUEENSIDE_RIGHT: Castling = Castling::BLACK_QUEENSIDE;
    const KINGSIDE_CASTLE: usize = CASTLE_BLACK_KINGSIDE;
    const QUEENSIDE_CASTLE: usize = CASTLE_BLACK_QUEENSIDE;
    const KINGSIDE_ROOK_HOME: Square = Square::BLACK_KINGSIDE_ROOK;
    const QUEENSIDE_ROOK_HOME: Square = Square::BLACK_QUEENSIDE_ROOK;

    const PAWN_START: Bitboard = Bitboard::RANK_7;
    const PROMOTION_FROM: Bitboard = Bitboard::RANK_2;

    // Black captures en passant on rank 3, against a pawn on rank 4.
    const EP_VICTIM_BASE: u8 = 24;
    const PUSH_OFFSET: i8 = -8;

    #[inline]
    fn pawn_attacks(pawns: Bitboard) -> Bitboard {
        pawns.step_south_east() | pawns.step_south_west()
    }

    #[inline]
    fn pawn_push(pawns: Bitboard) -> Bitboard {
        pawns.step_south()
    }
}
