use rand::{thread_rng, Rng};

use tafl_core::{
    board::{Bitboard, Square},
    move_gen::{
        bitboard_utils::{
            bishop_attacks, bishop_blocker_mask, nth_blocker_arrangement, rook_attacks,
            rook_blocker_mask,
        },
        lookups::gen_rays,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MagicType {
    Bishop,
    Rook,
}

/// Candidate magics want few set bits; and-ing three random words gets the
/// density about right.
fn random_u64_few_bits(r: &mut (impl Rng + ?Sized)) -> u64 {
    r.next_u64() & r.next_u64() & r.next_u64()
}

fn magic_index(board: Bitboard, magic: u64, num_bits: u32) -> usize {
    (board.0.wrapping_mul(magic) >> (64 - num_bits)) as usize
}

/// A candidate works when no two blocker arrangements with different attack
/// sets hash to the same slot. Colliding arrangements with identical
/// attacks are fine, which is what makes small tables possible at all.
fn is_magic(
    blocker_arrangements: &[Bitboard],
    attacks_per_arrangement: &[Bitboard],
    num_bits: u32,
    magic: u64,
) -> bool {
    assert!(blocker_arrangements.len() == attacks_per_arrangement.len());

    let mut used = vec![Bitboard::EMPTY; 1 << num_bits];

    for (&blockers, &attacks) in blocker_arrangements.iter().zip(attacks_per_arrangement) {
        let index = magic_index(blockers, magic, num_bits);
        if used[index] == Bitboard::EMPTY {
            used[index] = attacks;
        } else if used[index] != attacks {
            return false;
        }
    }

    true
}

fn find_magic(
    square: Square,
    magic_type: MagicType,
    target_bits: u32,
    search_limit: usize,
    r: &mut (impl Rng + ?Sized),
    rays: &[[Bitboard; 8]; 64],
) -> Option<u64> {
    let mask = match magic_type {
        MagicType::Bishop => bishop_blocker_mask(square, rays),
        MagicType::Rook => rook_blocker_mask(square, rays),
    };

    let num_bits_in_mask = mask.pop_count();
    let blocker_arrangements = (0..1 << num_bits_in_mask)
        .map(|n| nth_blocker_arrangement(n, mask))
        .collect::<Vec<_>>();
    let attacks_per_arrangement = blocker_arrangements
        .iter()
        .map(|&blockers| match magic_type {
            MagicType::Bishop => bishop_attacks(blockers, square, rays),
            MagicType::Rook => rook_attacks(blockers, square, rays),
        })
        .collect::<Vec<_>>();

    for _ in 0..search_limit {
        let magic = random_u64_few_bits(r);
        if is_magic(
            &blocker_arrangements,
            &attacks_per_arrangement,
            target_bits,
            magic,
        ) {
            return Some(magic);
        }
    }

    None
}

#[rustfmt::skip]
const ROOK_TARGET_BITS: [u32; 64] = [
    12, 11, 11, 11, 11, 11, 11, 12,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    12, 11, 11, 11, 11, 11, 11, 12,
];

#[rustfmt::skip]
const BISHOP_TARGET_BITS: [u32; 64] = [
    6, 5, 5, 5, 5, 5, 5, 6,
    5, 5, 5, 5, 5, 5, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 5, 5, 5, 5, 5, 5,
    6, 5, 5, 5, 5, 5, 5, 6,
];

fn print_magic_table(
    name: &str,
    magic_type: MagicType,
    target_bits: &[u32; 64],
    rays: &[[Bitboard; 8]; 64],
    rng: &mut (impl Rng + ?Sized),
) {
    println!("const {name}: [(u64, u32); 64] = [");
    for (i, &bits) in target_bits.iter().enumerate() {
        let square = Square::from_index_unchecked(i);
        let magic = find_magic(square, magic_type, bits, 1_000_000, rng, rays)
            .unwrap_or_else(|| panic!("no magic found for {square} within the search limit"));
        println!("    (0x{magic:016x}, {bits}),");
    }
    println!("];");
}

fn main() {
    let rays = gen_rays();
    let mut rng = thread_rng();

    print_magic_table(
        "ROOK_MAGICS",
        MagicType::Rook,
        &ROOK_TARGET_BITS,
        &rays,
        &mut rng,
    );
    println!();
    print_magic_table(
        "BISHOP_MAGICS",
        MagicType::Bishop,
        &BISHOP_TARGET_BITS,
        &rays,
        &mut rng,
    );
}
