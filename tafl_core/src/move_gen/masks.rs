//! Per-node legality masks.
//!
//! Instead of generating pseudo-legal moves and testing each one for king
//! safety, the generator derives a set of masks from the position once per
//! node. Intersecting a piece's reach (narrowed to its pin class while
//! pinned, see [`super::Attacker`]) with these masks yields its legal moves
//! directly; only king moves, castling and en passant need per-move attack
//! checks on top.

use crate::board::{Bitboard, BoardRepr, PieceType, Square};

use super::{xray_bishop_attacks, xray_rook_attacks, Lookups, Side};

/// Masks restricting the side to move's non-king pieces, pivoted on its
/// king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskSet {
    /// Squares non-king pieces may move to: everything not occupied by an
    /// own piece, narrowed to [`Self::check_mask`] while exactly one checker
    /// is attacking the king.
    pub can_move_to: Bitboard,
    /// All ones when the king is not in check. Under a single check, the
    /// checker's square plus, for a sliding checker, the empty squares
    /// between checker and king. Interposing or capturing inside this mask
    /// is the only way a non-king piece can answer a check.
    pub check_mask: Bitboard,
    /// Union of the rank/file segments from the king through each
    /// orthogonal pinner, both endpoints included. A piece on this mask may
    /// only move while staying on it.
    pub pinmask_orth: Bitboard,
    /// Same for diagonal pinners.
    pub pinmask_diag: Bitboard,
    /// Number of enemy pieces attacking the king: 0, 1 or 2.
    pub checkers: u32,
}

impl MaskSet {
    /// Derives the masks for side `S` from the current placement.
    pub fn build<S: Side>(board: &BoardRepr, king: Square, lookups: &Lookups) -> Self {
        let occupied = board.occupied();
        let own = board[S::COLOR];

        let opp_rooks_queens = board[<S::Opp as Side>::piece(PieceType::Rook)]
            | board[<S::Opp as Side>::piece(PieceType::Queen)];
        let opp_bishops_queens = board[<S::Opp as Side>::piece(PieceType::Bishop)]
            | board[<S::Opp as Side>::piece(PieceType::Queen)];

        let king_bb = Bitboard::from_square(king);

        // Checkers, found by asking what each enemy piece kind could reach
        // from the king's own square.
        let mut checkers_bb =
            S::pawn_attacks(king_bb) & board[<S::Opp as Side>::piece(PieceType::Pawn)];
        checkers_bb |=
            lookups.knight_moves(king) & board[<S::Opp as Side>::piece(PieceType::Knight)];
        checkers_bb |= lookups.bishop_attacks(occupied, king) & opp_bishops_queens;
        checkers_bb |= lookups.rook_attacks(occupied, king) & opp_rooks_queens;

        let checkers = checkers_bb.pop_count();

        let check_mask = match checkers {
            0 => Bitboard::ALL,
            1 => {
                // A contact checker contributes nothing in between, so this
                // also covers pawns and knights.
                let checker = checkers_bb.to_square().unwrap();
                checkers_bb | lookups.in_between(king, checker)
            }
            // With two checkers only the king moves; the mask is never read.
            _ => Bitboard::EMPTY,
        };

        // Pinners are enemy sliders revealed by x-raying through own pieces.
        // Each revealed pinner has exactly one own piece between itself and
        // the king, and the full segment becomes that piece's movement ray.
        let mut pinmask_orth = Bitboard::EMPTY;
        for pinner in (xray_rook_attacks(occupied, own, king, lookups) & opp_rooks_queens).squares()
        {
            pinmask_orth |=
                lookups.in_between(king, pinner) | Bitboard::from_square(pinner) | king_bb;
        }

        let mut pinmask_diag = Bitboard::EMPTY;
        for pinner in
            (xray_bishop_attacks(occupied, own, king, lookups) & opp_bishops_queens).squares()
        {
            pinmask_diag |=
                lookups.in_between(king, pinner) | Bitboard::from_square(pinner) | king_bb;
        }

        let mut can_move_to = !own;
        if checkers == 1 {
            can_move_to &= check_mask;
        }

        Self {
            can_move_to,
            check_mask,
            pinmask_orth,
            pinmask_diag,
            checkers,
        }
    }
}
