//! Bitboard primitives used to build the lookup and magic tables.
//!
//! Everything here is setup-time code; move generation proper goes through
//! [`crate::move_gen::Lookups`].

use num_derive::{FromPrimitive, ToPrimitive};

use crate::board::{Bitboard, Square};

/// A ray direction on the board.
///
/// The first four variants are the "positive" directions, in which square
/// indices increase along the ray. Blocked-ray computation scans for the
/// first blocker with a forward bitscan on positive rays and a reverse
/// bitscan on negative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum Direction {
    East = 0,
    North = 1,
    NorthEast = 2,
    NorthWest = 3,
    West = 4,
    South = 5,
    SouthWest = 6,
    SouthEast = 7,
}

/// Attack pattern of a knight on every set square of `b`.
pub fn knight_attacks(b: Bitboard) -> Bitboard {
    const NOT_A_FILE: Bitboard = Bitboard::A_FILE.not();
    const NOT_AB_FILE: Bitboard = Bitboard::A_FILE.or(Bitboard::B_FILE).not();
    const NOT_H_FILE: Bitboard = Bitboard::H_FILE.not();
    const NOT_GH_FILE: Bitboard = Bitboard::G_FILE.or(Bitboard::H_FILE).not();

    let mut attacks = Bitboard::EMPTY;

    attacks |= (b << 17) & NOT_A_FILE;
    attacks |= (b << 10) & NOT_AB_FILE;
    attacks |= (b >> 6) & NOT_AB_FILE;
    attacks |= (b >> 15) & NOT_A_FILE;
    attacks |= (b << 15) & NOT_H_FILE;
    attacks |= (b << 6) & NOT_GH_FILE;
    attacks |= (b >> 10) & NOT_GH_FILE;
    attacks |= (b >> 17) & NOT_H_FILE;

    attacks
}

/// Move pattern of a king on every set square of `b`.
pub fn king_moves(b: Bitboard) -> Bitboard {
    let mut moves = b.step_east() | b.step_west();
    let widened = b | moves;
    moves |= widened.step_north() | widened.step_south();

    moves
}

/// The full, unblocked ray from every set square of `b` in one direction.
pub(super) fn unblocked_ray(b: Bitboard, dir: Direction) -> Bitboard {
    let step = match dir {
        Direction::East => Bitboard::step_east,
        Direction::North => Bitboard::step_north,
        Direction::NorthEast => Bitboard::step_north_east,
        Direction::NorthWest => Bitboard::step_north_west,
        Direction::West => Bitboard::step_west,
        Direction::South => Bitboard::step_south,
        Direction::SouthWest => Bitboard::step_south_west,
        Direction::SouthEast => Bitboard::step_south_east,
    };

    let mut ray = step(b);
    loop {
        let extended = ray | step(ray);
        if extended == ray {
            break;
        }
        ray = extended;
    }

    ray
}

fn positive_ray_attacks(
    occupied: Bitboard,
    square: Square,
    dir: Direction,
    rays: &[[Bitboard; 8]; 64],
) -> Bitboard {
    let attacks = rays[square.index()][dir as usize];
    let blockers = attacks & occupied;
    // The sentinel bit keeps the bitscan in range when the ray is open.
    let first_blocker = (blockers | Bitboard(0x8000_0000_0000_0000)).lsb();
    attacks ^ rays[first_blocker as usize][dir as usize]
}

fn negative_ray_attacks(
    occupied: Bitboard,
    square: Square,
    dir: Direction,
    rays: &[[Bitboard; 8]; 64],
) -> Bitboard {
    let attacks = rays[square.index()][dir as usize];
    let blockers = attacks & occupied;
    let first_blocker = (blockers | Bitboard(1)).msb();
    attacks ^ rays[first_blocker as usize][dir as usize]
}

/// Rook attacks from `square`, stopping at (and including) the first blocker
/// in each direction.
///
/// `rays` is an unblocked ray table from [`crate::move_gen::lookups::gen_rays`].
pub fn rook_attacks(occupied: Bitboard, square: Square, rays: &[[Bitboard; 8]; 64]) -> Bitboard {
    positive_ray_attacks(occupied, square, Direction::North, rays)
        | positive_ray_attacks(occupied, square, Direction::East, rays)
        | negative_ray_attacks(occupied, square, Direction::South, rays)
        | negative_ray_attacks(occupied, square, Direction::West, rays)
}

/// Bishop attacks from `square`, stopping at (and including) the first
/// blocker in each direction.
pub fn bishop_attacks(occupied: Bitboard, square: Square, rays: &[[Bitboard; 8]; 64]) -> Bitboard {
    positive_ray_attacks(occupied, square, Direction::NorthEast, rays)
        | positive_ray_attacks(occupied, square, Direction::NorthWest, rays)
        | negative_ray_attacks(occupied, square, Direction::SouthWest, rays)
        | negative_ray_attacks(occupied, square, Direction::SouthEast, rays)
}

/// Squares on which a piece can affect the attack pattern of a rook on
/// `square`.
///
/// The last square of each ray always appears in the attack set whether or
/// not it is occupied, so board-edge squares are excluded from the mask.
pub fn rook_blocker_mask(square: Square, rays: &[[Bitboard; 8]; 64]) -> Bitboard {
    let vertical = (rays[square.index()][Direction::North as usize]
        | rays[square.index()][Direction::South as usize])
        .without(Bitboard::RANK_1 | Bitboard::RANK_8);
    let horizontal = (rays[square.index()][Direction::East as usize]
        | rays[square.index()][Direction::West as usize])
        .without(Bitboard::A_FILE | Bitboard::H_FILE);

    vertical | horizontal
}

/// Squares on which a piece can affect the attack pattern of a bishop on
/// `square`.
pub fn bishop_blocker_mask(square: Square, rays: &[[Bitboard; 8]; 64]) -> Bitboard {
    let edges = Bitboard::RANK_1 | Bitboard::RANK_8 | Bitboard::A_FILE | Bitboard::H_FILE;

    (rays[square.index()][Direction::NorthEast as usize]
        | rays[square.index()][Direction::NorthWest as usize]
        | rays[square.index()][Direction::SouthWest as usize]
        | rays[square.index()][Direction::SouthEast as usize])
        .without(edges)
}

/// Scatters the low bits of `n` onto the set squares of `mask`.
///
/// Iterating `n` over `0..1 << mask.pop_count()` enumerates every blocker
/// arrangement for the mask, which is how the magic attack tables and the
/// magic search enumerate subsets.
pub fn nth_blocker_arrangement(mut n: usize, mask: Bitboard) -> Bitboard {
    let mut result = 0u64;
    for i in mask.bits() {
        result |= ((n & 1) as u64) << i;
        n >>= 1;
    }
    Bitboard(result)
}

#[cfg(test)]
mod test {
    use crate::move_gen::lookups::gen_rays;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_knight_attacks() {
        assert_eq!(
            knight_attacks(Bitboard::from_square(Square::D4)),
            "
                . . . . . . . .
                . . . . . . . .
                . . # . # . . .
                . # . . . # . .
                . . . . . . . .
                . # . . . # . .
                . . # . # . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );

        assert_eq!(
            knight_attacks(Bitboard::from_square(Square::A1)),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . # . . . . . .
                . . # . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );

        assert_eq!(
            knight_attacks(Bitboard::from_square(Square::G7)),
            "
                . . . . # . . .
                . . . . . . . .
                . . . . # . . .
                . . . . . # . #
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn test_king_moves() {
        assert_eq!(
            king_moves(Bitboard::from_square(Square::D4)),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . # # # . . .
                . . # . # . . .
                . . # # # . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );

        assert_eq!(
            king_moves(Bitboard::from_square(Square::E1)),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . # # # . .
                . . . # . # . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn test_rook_attacks() {
        let rays = gen_rays();
        assert_eq!(
            rook_attacks(Bitboard::EMPTY, Square::E4, &rays),
            "
                . . . . # . . .
                . . . . # . . .
                . . . . # . . .
                . . . . # . . .
                # # # # . # # #
                . . . . # . . .
                . . . . # . . .
                . . . . # . . .
            "
            .parse()
            .unwrap(),
        );

        let occupied = "
                . . . . . . . .
                . . . . # . . .
                . . . . . . . .
                . . . . # . . .
                . . # . # . . .
                . . . . . . . .
                . . . # . . . .
                . . . . # . . .
        "
        .parse()
        .unwrap();
        assert_eq!(
            rook_attacks(occupied, Square::E4, &rays),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . # . . .
                . . # # . # # #
                . . . . # . . .
                . . . . # . . .
                . . . . # . . .
            "
            .parse()
            .unwrap(),
        );
    }

    #[test]
    fn test_bishop_attacks() {
        let rays = gen_rays();
        assert_eq!(
            bishop_attacks(Bitboard::EMPTY, Square::E4, &rays),
            "
                # . . . . . . .
                . # . . . . . #
                . . # . . . # .
                . . . # . # . .
                . . . . . . . .
                . . . # . # . .
                . . # . . . # .
                . # . . . . . #
            "
            .parse()
            .unwrap(),
        );

        let occupied = "
                . . . . . . . .
                . # . . . . . .
                . . . . . . . .
                . . . # . . . .
                . . . # # . . .
                . . . . . . . .
                . . # . . . . .
                . . . . . . . .
        "
        .parse()
        .unwrap();
        assert_eq!(
            bishop_attacks(occupied, Square::E4, &rays),
            "
                . . . . . . . .
                . . . . . . . #
                . . . . . . # .
                . . . # . # . .
                . . . . . . . .
                . . . # . # . .
                . . # . . . # .
                . . . . . . . #
            "
            .parse()
            .unwrap(),
        );
    }

    #[test]
    fn test_rook_blocker_mask() {
        let rays = gen_rays();

        assert_eq!(
            rook_blocker_mask(Square::A1, &rays),
            "
                . . . . . . . .
                # . . . . . . .
                # . . . . . . .
                # . . . . . . .
                # . . . . . . .
                # . . . . . . .
                # . . . . . . .
                . # # # # # # .
            "
            .parse()
            .unwrap()
        );

        assert_eq!(
            rook_blocker_mask(Square::D3, &rays),
            "
                . . . . . . . .
                . . . # . . . .
                . . . # . . . .
                . . . # . . . .
                . . . # . . . .
                . # # . # # # .
                . . . # . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn test_bishop_blocker_mask() {
        let rays = gen_rays();

        assert_eq!(
            bishop_blocker_mask(Square::D3, &rays),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . # .
                . # . . . # . .
                . . # . # . . .
                . . . . . . . .
                . . # . # . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn test_nth_blocker_arrangement() {
        let mask = 0b11001010;
        let cases = [
            (0, 0b00000000),
            (1, 0b00000010),
            (2, 0b00001000),
            (3, 0b00001010),
            (5, 0b01000010),
            (10, 0b10001000),
            (15, 0b11001010),
        ];

        for (n, expected) in cases {
            assert_eq!(
                nth_blocker_arrangement(n, Bitboard(mask)),
                Bitboard(expected)
            );
        }
    }
}
