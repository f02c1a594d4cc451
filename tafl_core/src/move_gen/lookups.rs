//! Precomputed attack lookup tables.

use std::sync::OnceLock;

use num_traits::FromPrimitive;

use crate::board::{Bitboard, Square};

use super::{
    bitboard_utils::{king_moves, knight_attacks, unblocked_ray, Direction},
    magic::MagicTables,
};

/// Read-only lookup tables answering "what does this piece attack from this
/// square, given this occupancy" in a table access.
///
/// Built once, on first use, via [`Lookups::get_instance`]; the returned
/// `&'static` reference can be held for the duration of a search. King and
/// knight tables are plain 64-entry arrays, sliding pieces go through the
/// magic tables, and `in_between` serves checkmask and pin construction.
pub struct Lookups {
    knight_moves: [Bitboard; 64],
    king_moves: [Bitboard; 64],
    in_between: [[Bitboard; 64]; 64],

    magic: MagicTables,
}

static LOOKUPS: OnceLock<Lookups> = OnceLock::new();

impl Lookups {
    fn new() -> Self {
        let rays = gen_rays();

        Self {
            knight_moves: gen_knight_tables(),
            king_moves: gen_king_tables(),
            in_between: gen_in_between(&rays),
            magic: MagicTables::new(&rays),
        }
    }

    /// The global [`Lookups`] instance, built on the first call.
    pub fn get_instance() -> &'static Self {
        LOOKUPS.get_or_init(Self::new)
    }

    /// All knight moves from the given square.
    pub fn knight_moves(&self, square: Square) -> Bitboard {
        self.knight_moves[square.index()]
    }

    /// All king moves from the given square.
    pub fn king_moves(&self, square: Square) -> Bitboard {
        self.king_moves[square.index()]
    }

    /// Rook attacks from the given square. The first occupied square in each
    /// direction is included in the result, so captures show up as attacks.
    pub fn rook_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        self.magic.rook_attacks(occupied, square)
    }

    /// Bishop attacks from the given square, first blocker included.
    pub fn bishop_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        self.magic.bishop_attacks(occupied, square)
    }

    /// Queen attacks from the given square, first blocker included.
    pub fn queen_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        self.rook_attacks(occupied, square) | self.bishop_attacks(occupied, square)
    }

    /// The squares strictly between two squares on a shared rank, file or
    /// diagonal, excluding both endpoints. Empty when the squares share no
    /// line; symmetric in its arguments.
    pub fn in_between(&self, from: Square, to: Square) -> Bitboard {
        self.in_between[from.index()][to.index()]
    }
}

fn gen_knight_tables() -> [Bitboard; 64] {
    let mut moves = [Bitboard::EMPTY; 64];
    for (i, entry) in moves.iter_mut().enumerate() {
        *entry = knight_attacks(Bitboard::from_index(i as u8));
    }
    moves
}

fn gen_king_tables() -> [Bitboard; 64] {
    let mut moves = [Bitboard::EMPTY; 64];
    for (i, entry) in moves.iter_mut().enumerate() {
        *entry = king_moves(Bitboard::from_index(i as u8));
    }
    moves
}

/// Generates the unblocked ray table, indexed by square then [`Direction`].
pub fn gen_rays() -> [[Bitboard; 8]; 64] {
    let mut rays = [[Bitboard::EMPTY; 8]; 64];

    for (i, rays_from_square) in rays.iter_mut().enumerate() {
        let base = Bitboard::from_index(i as u8);

        for (dir, ray) in rays_from_square.iter_mut().enumerate() {
            *ray = unblocked_ray(base, Direction::from_usize(dir).unwrap());
        }
    }

    rays
}

/// Generates the in-between table from an unblocked ray table.
///
/// Walking each positive-direction ray is enough: subtracting the tail ray
/// from the target square leaves exactly the in-between segment, and the
/// table is filled symmetrically.
fn gen_in_between(rays: &[[Bitboard; 8]; 64]) -> [[Bitboard; 64]; 64] {
    let mut table = [[Bitboard::EMPTY; 64]; 64];

    for from in 0..64 {
        for dir in 0..4 {
            let ray = rays[from][dir];
            for to in ray.bits() {
                let to = to as usize;
                let between = ray ^ rays[to][dir] ^ Bitboard::from_index(to as u8);
                table[from][to] = between;
                table[to][from] = between;
            }
        }
    }

    table
}
