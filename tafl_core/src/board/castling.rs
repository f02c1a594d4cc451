use bitflags::bitflags;

use super::Square;

bitflags! {
    /// Castling rights still available to both players.
    ///
    /// A flag being set means the corresponding king and rook have not moved
    /// yet. Transient conditions (occupied or attacked squares on the king's
    /// path) are not tracked here; move generation checks those per move.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Castling: u8 {
        const WHITE_KINGSIDE  = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE  = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;

        const WHITE = Self::WHITE_KINGSIDE.bits() | Self::WHITE_QUEENSIDE.bits();
        const BLACK = Self::BLACK_KINGSIDE.bits() | Self::BLACK_QUEENSIDE.bits();
    }
}

impl Default for Castling {
    fn default() -> Self {
        Self::all()
    }
}

impl Castling {
    /// The castling field of a FEN string: `KQkq` subset, or `-` when no
    /// rights remain.
    pub fn as_fen_str(self) -> String {
        if self.is_empty() {
            return "-".to_owned();
        }

        let mut result = String::with_capacity(4);
        if self.contains(Self::WHITE_KINGSIDE) {
            result.push('K');
        }
        if self.contains(Self::WHITE_QUEENSIDE) {
            result.push('Q');
        }
        if self.contains(Self::BLACK_KINGSIDE) {
            result.push('k');
        }
        if self.contains(Self::BLACK_QUEENSIDE) {
            result.push('q');
        }
        result
    }
}

/// The squares involved in one castling move.
///
/// `rook_to` doubles as the square the king passes through, for every one of
/// the four castles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleSquares {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    pub right: Castling,
}

/// Castle code for white kingside castling.
pub const CASTLE_WHITE_KINGSIDE: usize = 0;
/// Castle code for white queenside castling.
pub const CASTLE_WHITE_QUEENSIDE: usize = 1;
/// Castle code for black kingside castling.
pub const CASTLE_BLACK_KINGSIDE: usize = 2;
/// Castle code for black queenside castling.
pub const CASTLE_BLACK_QUEENSIDE: usize = 3;

/// Square data for the four castling moves, indexed by castle code.
pub const CASTLES: [CastleSquares; 4] = [
    CastleSquares {
        king_from: Square::E1,
        king_to: Square::G1,
        rook_from: Square::H1,
        rook_to: Square::F1,
        right: Castling::WHITE_KINGSIDE,
    },
    CastleSquares {
        king_from: Square::E1,
        king_to: Square::C1,
        rook_from: Square::A1,
        rook_to: Square::D1,
        right: Castling::WHITE_QUEENSIDE,
    },
    CastleSquares {
        king_from: Square::E8,
        king_to: Square::G8,
        rook_from: Square::H8,
        rook_to: Square::F8,
        right: Castling::BLACK_KINGSIDE,
    },
    CastleSquares {
        king_from: Square::E8,
        king_to: Square::C8,
        rook_from: Square::A8,
        rook_to: Square::D8,
        right: Castling::BLACK_QUEENSIDE,
    },
];

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn castling_as_fen_str() {
        assert_eq!(Castling::empty().as_fen_str(), "-");
        assert_eq!(Castling::WHITE_KINGSIDE.as_fen_str(), "K");
        assert_eq!(Castling::WHITE.as_fen_str(), "KQ");
        assert_eq!(Castling::BLACK.as_fen_str(), "kq");
        assert_eq!(
            (Castling::WHITE_KINGSIDE | Castling::BLACK_QUEENSIDE).as_fen_str(),
            "Kq"
        );
        assert_eq!(Castling::all().as_fen_str(), "KQkq");
    }

    #[test]
    fn castle_table_matches_rook_homes() {
        assert_eq!(
            CASTLES[CASTLE_WHITE_KINGSIDE].rook_from,
            Square::WHITE_KINGSIDE_ROOK
        );
        assert_eq!(
            CASTLES[CASTLE_WHITE_QUEENSIDE].rook_from,
            Square::WHITE_QUEENSIDE_ROOK
        );
        assert_eq!(
            CASTLES[CASTLE_BLACK_KINGSIDE].rook_from,
            Square::BLACK_KINGSIDE_ROOK
        );
        assert_eq!(
            CASTLES[CASTLE_BLACK_QUEENSIDE].rook_from,
            Square::BLACK_QUEENSIDE_ROOK
        );
    }

    #[test]
    fn king_passes_over_the_rook_destination() {
        for castle in CASTLES {
            let passed = (castle.king_from.get() + castle.king_to.get()) / 2;
            assert_eq!(Square::from_u8_unchecked(passed), castle.rook_to);
        }
    }
}
