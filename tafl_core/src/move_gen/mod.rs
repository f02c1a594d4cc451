//! Attack lookups, legality masks and colour/piece monomorphization.

use crate::board::{Bitboard, BoardRepr, PieceType, Square};

pub mod bitboard_utils;
pub mod lookups;
pub mod magic;
mod masks;
mod side;

pub use lookups::Lookups;
pub use masks::MaskSet;
pub use side::{Black, Side, White};

/// Pseudo-legal reach of one piece kind, resolved at compile time.
///
/// Implemented by zero-sized marker types so that move generation can be
/// written once, generic over the kind, and monomorphize into a dedicated
/// routine per piece with the lookup dispatch inlined away.
///
/// The pinned variants give the reach a piece of this kind keeps while
/// absolutely pinned. Restricting a pinned piece to the movement class of
/// its pin line is what makes "reach intersected with the pin mask" exact:
/// orthogonal reach from a square on one of the king's orthogonal pin
/// segments can only meet the mask on that piece's own segment, and
/// likewise diagonally. Cross-class reach (a pinned queen's diagonal step,
/// any knight jump) can land on one of the *other* pin segments in the
/// mask, which would let the piece abandon its own pin, so it is cut to
/// nothing instead.
pub trait Attacker {
    const KIND: PieceType;

    fn attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard;

    /// Reach while pinned on a rank or file.
    fn orth_pinned_attacks(_from: Square, _occupied: Bitboard, _lookups: &Lookups) -> Bitboard {
        Bitboard::EMPTY
    }

    /// Reach while pinned on a diagonal.
    fn diag_pinned_attacks(_from: Square, _occupied: Bitboard, _lookups: &Lookups) -> Bitboard {
        Bitboard::EMPTY
    }
}

pub struct Knights;
pub struct Bishops;
pub struct Rooks;
pub struct Queens;

impl Attacker for Knights {
    const KIND: PieceType = PieceType::Knight;

    #[inline]
    fn attacks(from: Square, _occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.knight_moves(from)
    }
}

impl Attacker for Bishops {
    const KIND: PieceType = PieceType::Bishop;

    #[inline]
    fn attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.bishop_attacks(occupied, from)
    }

    #[inline]
    fn diag_pinned_attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.bishop_attacks(occupied, from)
    }
}

impl Attacker for Rooks {
    const KIND: PieceType = PieceType::Rook;

    #[inline]
    fn attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.rook_attacks(occupied, from)
    }

    #[inline]
    fn orth_pinned_attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.rook_attacks(occupied, from)
    }
}

impl Attacker for Queens {
    const KIND: PieceType = PieceType::Queen;

    #[inline]
    fn attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.queen_attacks(occupied, from)
    }

    #[inline]
    fn orth_pinned_attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.rook_attacks(occupied, from)
    }

    #[inline]
    fn diag_pinned_attacks(from: Square, occupied: Bitboard, lookups: &Lookups) -> Bitboard {
        lookups.bishop_attacks(occupied, from)
    }
}

/// Whether any piece of colour `S` attacks `square` under the given
/// occupancy.
///
/// The occupancy is passed explicitly so callers probing a mutated position
/// (a king stepping off its square, an en passant capture) see the attacks
/// of the board as it stands now, not as it was.
pub fn square_attacked_by<S: Side>(
    board: &BoardRepr,
    occupied: Bitboard,
    square: Square,
    lookups: &Lookups,
) -> bool {
    let target = Bitboard::from_square(square);

    // A pawn of S attacks `square` exactly when a pawn-attack fan spread
    // from `square` in the opposite direction lands on one of S's pawns.
    if (<S::Opp as Side>::pawn_attacks(target) & board[S::piece(PieceType::Pawn)]).has_piece() {
        return true;
    }

    if (lookups.knight_moves(square) & board[S::piece(PieceType::Knight)]).has_piece() {
        return true;
    }

    let diagonal_attackers =
        board[S::piece(PieceType::Bishop)] | board[S::piece(PieceType::Queen)];
    if (lookups.bishop_attacks(occupied, square) & diagonal_attackers).has_piece() {
        return true;
    }

    let orthogonal_attackers =
        board[S::piece(PieceType::Rook)] | board[S::piece(PieceType::Queen)];
    if (lookups.rook_attacks(occupied, square) & orthogonal_attackers).has_piece() {
        return true;
    }

    (lookups.king_moves(square) & board[S::piece(PieceType::King)]).has_piece()
}

/// Squares an orthogonal slider on `square` would attack if the first own
/// piece on each ray were transparent. Intersecting with enemy sliders
/// yields pin candidates.
fn xray_rook_attacks(
    occupied: Bitboard,
    own_pieces: Bitboard,
    square: Square,
    lookups: &Lookups,
) -> Bitboard {
    let attacks = lookups.rook_attacks(occupied, square);
    let blockers = own_pieces & attacks;
    attacks ^ lookups.rook_attacks(occupied ^ blockers, square)
}

/// Diagonal counterpart of [`xray_rook_attacks`].
fn xray_bishop_attacks(
    occupied: Bitboard,
    own_pieces: Bitboard,
    square: Square,
    lookups: &Lookups,
) -> Bitboard {
    let attacks = lookups.bishop_attacks(occupied, square);
    let blockers = own_pieces & attacks;
    attacks ^ lookups.bishop_attacks(occupied ^ blockers, square)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::Position;
    use crate::board::Color;

    fn attacked_by_white(fen: &str, square: &str) -> bool {
        let position = Position::try_parse_fen(fen).unwrap();
        let square = square.parse().unwrap();
        square_attacked_by::<White>(
            position.board(),
            position.board().occupied(),
            square,
            Lookups::get_instance(),
        )
    }

    #[test]
    fn pawn_attacks_are_diagonal_only() {
        let fen = "4k3/8/8/8/8/4P3/8/4K3 w - - 0 1";
        assert!(attacked_by_white(fen, "d4"));
        assert!(attacked_by_white(fen, "f4"));
        assert!(!attacked_by_white(fen, "e4"));
    }

    #[test]
    fn slider_attacks_stop_at_blockers() {
        let fen = "4k3/8/8/8/4n3/8/8/K3R3 w - - 0 1";
        assert!(attacked_by_white(fen, "e4"));
        assert!(!attacked_by_white(fen, "e5"));
        assert!(attacked_by_white(fen, "d1"));
    }

    #[test]
    fn king_contributes_attacks() {
        let fen = "4k3/8/8/8/8/8/8/K7 w - - 0 1";
        assert!(attacked_by_white(fen, "b2"));
        assert!(!attacked_by_white(fen, "c3"));
    }

    #[test]
    fn queen_attacks_both_ways() {
        let position = Position::try_parse_fen("4k3/8/8/3q4/8/8/8/4K3 w - - 0 1").unwrap();
        let lookups = Lookups::get_instance();

        for square in ["d1", "a5", "h5", "g8", "a2"] {
            assert!(
                square_attacked_by::<Black>(
                    position.board(),
                    position.board().occupied(),
                    square.parse().unwrap(),
                    lookups,
                ),
                "queen should attack {square}"
            );
        }

        assert!(!square_attacked_by::<Black>(
            position.board(),
            position.board().occupied(),
            "c2".parse().unwrap(),
            lookups,
        ));
    }

    #[test]
    fn attacker_kinds_line_up() {
        assert_eq!(Knights::KIND, PieceType::Knight);
        assert_eq!(Bishops::KIND, PieceType::Bishop);
        assert_eq!(Rooks::KIND, PieceType::Rook);
        assert_eq!(Queens::KIND, PieceType::Queen);
    }

    #[test]
    fn side_colors_flip() {
        assert_eq!(White::COLOR, Color::White);
        assert_eq!(Black::COLOR, Color::Black);
        assert_eq!(<<White as Side>::Opp as Side>::COLOR, Color::Black);
        assert_eq!(<<Black as Side>::Opp as Side>::COLOR, Color::White);
    }
}
