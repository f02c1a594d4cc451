//! Perft: exhaustive legal move tree counting.
//!
//! `perft(position, depth)` counts the leaf positions of the complete legal
//! move tree of the given depth. The recursion mutates a single [`Position`]
//! in place, wrapping every descent in a make/unmake pair, and derives a
//! fresh [`MaskSet`] per node so that pseudo-legal reach intersected with
//! the masks is already legal for non-king pieces.
//!
//! Per node the move families run in a fixed order: king moves, castles,
//! queens, rooks, bishops, knights, pawns, en passant. King moves and en
//! passant are validated by making the move and probing the mutated board
//! for attacks on the king; everything else is settled by the masks. At the
//! last ply the per-piece counts collapse to popcounts over the masked
//! destination sets, with no makes at all, except for the families that
//! still need per-move validation.

use crate::board::{Bitboard, Color, PieceType, Position, Square, CASTLES};
use crate::move_gen::{
    square_attacked_by, Attacker, Bishops, Black, Knights, Lookups, MaskSet, Queens, Rooks, Side,
    White,
};

const PROMOTION_KINDS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Knight,
    PieceType::Rook,
    PieceType::Bishop,
];

/// Counts the leaf positions exactly `depth` plies below `position`.
///
/// The position is restored before returning. `perft(position, 0)` is 1.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    let lookups = Lookups::get_instance();
    match position.to_move() {
        Color::White => count_moves::<White, false>(position, lookups, depth),
        Color::Black => count_moves::<Black, false>(position, lookups, depth),
    }
}

/// As [`perft`], but prints `<from><to>: <count>` for every legal root move.
///
/// Children are counted silently; the printed counts sum to the returned
/// total. Promotions print one line per promotion piece.
pub fn perft_divide(position: &mut Position, depth: u32) -> u64 {
    let lookups = Lookups::get_instance();
    match position.to_move() {
        Color::White => count_moves::<White, true>(position, lookups, depth),
        Color::Black => count_moves::<Black, true>(position, lookups, depth),
    }
}

fn report<const DIVIDE: bool>(from: Square, to: Square, nodes: u64) {
    if DIVIDE {
        println!("{from}{to}: {nodes}");
    }
}

fn count_moves<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    depth: u32,
) -> u64 {
    if depth == 0 {
        return 1;
    }

    let king = position.board().king_square(S::COLOR);
    let masks = MaskSet::build::<S>(position.board(), king, lookups);

    let mut nodes = king_moves::<S, DIVIDE>(position, lookups, king, depth);

    // Under double check nothing but the king may move.
    if masks.checkers >= 2 {
        return nodes;
    }

    // Castling is never available while in check.
    if masks.checkers == 0 {
        nodes += castle_moves::<S, DIVIDE>(position, lookups, depth);
    }

    nodes += piece_moves::<S, Queens, DIVIDE>(position, lookups, &masks, depth);
    nodes += piece_moves::<S, Rooks, DIVIDE>(position, lookups, &masks, depth);
    nodes += piece_moves::<S, Bishops, DIVIDE>(position, lookups, &masks, depth);
    nodes += piece_moves::<S, Knights, DIVIDE>(position, lookups, &masks, depth);
    nodes += pawn_moves::<S, DIVIDE>(position, lookups, &masks, depth);
    nodes += en_passant_moves::<S, DIVIDE>(position, lookups, king, depth);

    nodes
}

/// King moves cannot be settled by the masks alone: stepping off the start
/// square may expose the king to a slider it was blocking. Each candidate is
/// made on the board and kept only if the destination is unattacked in the
/// mutated position.
fn king_moves<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    king: Square,
    depth: u32,
) -> u64 {
    let mut nodes = 0;
    let opp = <S::Opp as Side>::COLOR;
    let targets = lookups.king_moves(king) & !position.board()[S::COLOR];

    for to in targets.squares() {
        let n = match position.board().piece_type_at(opp, to) {
            Some(captured) => {
                position.make_capture::<S>(PieceType::King, king, to, captured);
                let n = if square_attacked_by::<S::Opp>(
                    position.board(),
                    position.board().occupied(),
                    to,
                    lookups,
                ) {
                    None
                } else {
                    Some(count_moves::<S::Opp, false>(position, lookups, depth - 1))
                };
                position.unmake_capture::<S>(PieceType::King, king, to, captured);
                n
            }
            None => {
                position.make_plain::<S>(PieceType::King, king, to);
                let n = if square_attacked_by::<S::Opp>(
                    position.board(),
                    position.board().occupied(),
                    to,
                    lookups,
                ) {
                    None
                } else {
                    Some(count_moves::<S::Opp, false>(position, lookups, depth - 1))
                };
                position.unmake_plain::<S>(PieceType::King, king, to);
                n
            }
        };

        if let Some(n) = n {
            report::<DIVIDE>(king, to, n);
            nodes += n;
        }
    }

    nodes
}

/// Attempts both castles for side `S`. A castle is playable when the right
/// survives, every square between king and rook is empty (for queenside
/// that includes the knight's square, which need not be safe), and the two
/// squares the king crosses are unattacked. The king's own square is known
/// safe because castling is skipped entirely while in check.
fn castle_moves<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    depth: u32,
) -> u64 {
    let mut nodes = 0;

    for code in [S::KINGSIDE_CASTLE, S::QUEENSIDE_CASTLE] {
        let castle = &CASTLES[code];

        if !position.state().castling().contains(castle.right) {
            continue;
        }

        let between = lookups.in_between(castle.king_from, castle.rook_from);
        if (between & position.board().occupied()).has_piece() {
            continue;
        }

        // The king passes over the rook's destination square.
        let board = position.board();
        let occupied = board.occupied();
        if square_attacked_by::<S::Opp>(board, occupied, castle.rook_to, lookups)
            || square_attacked_by::<S::Opp>(board, occupied, castle.king_to, lookups)
        {
            continue;
        }

        let n = if depth <= 1 && !DIVIDE {
            1
        } else {
            position.make_castle::<S>(code);
            let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
            position.unmake_castle::<S>(code);
            n
        };

        report::<DIVIDE>(castle.king_from, castle.king_to, n);
        nodes += n;
    }

    nodes
}

/// Generates all moves of one piece kind, splitting the pieces by pin state
/// first. Pinned pieces keep the reach matching their pin class (see
/// [`Attacker`]) intersected with the pin mask, which is exactly their
/// legal move set.
fn piece_moves<S: Side, A: Attacker, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    masks: &MaskSet,
    depth: u32,
) -> u64 {
    let pieces = position.board()[S::piece(A::KIND)];
    let pinned_diag = pieces & masks.pinmask_diag;
    let pinned_orth = pieces & masks.pinmask_orth;
    let unpinned = pieces & !(pinned_diag | pinned_orth);

    let mut nodes = moves_from_set::<S, DIVIDE>(
        position,
        lookups,
        A::KIND,
        A::attacks,
        masks.can_move_to,
        unpinned,
        depth,
    );
    nodes += moves_from_set::<S, DIVIDE>(
        position,
        lookups,
        A::KIND,
        A::diag_pinned_attacks,
        masks.can_move_to & masks.pinmask_diag,
        pinned_diag,
        depth,
    );
    nodes += moves_from_set::<S, DIVIDE>(
        position,
        lookups,
        A::KIND,
        A::orth_pinned_attacks,
        masks.can_move_to & masks.pinmask_orth,
        pinned_orth,
        depth,
    );

    nodes
}

fn moves_from_set<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    kind: PieceType,
    reach: fn(Square, Bitboard, &Lookups) -> Bitboard,
    targets_mask: Bitboard,
    pieces: Bitboard,
    depth: u32,
) -> u64 {
    let mut nodes = 0;
    let opp = <S::Opp as Side>::COLOR;

    for from in pieces.squares() {
        let reachable = reach(from, position.board().occupied(), lookups) & targets_mask;

        // Every masked destination is legal, so the last ply is a popcount.
        if depth <= 1 && !DIVIDE {
            nodes += reachable.pop_count() as u64;
            continue;
        }

        let captures = reachable & position.board()[opp];
        let quiets = reachable ^ captures;

        for to in quiets.squares() {
            position.make_plain::<S>(kind, from, to);
            let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
            position.unmake_plain::<S>(kind, from, to);

            report::<DIVIDE>(from, to, n);
            nodes += n;
        }

        for to in captures.squares() {
            let captured = position
                .board()
                .piece_type_at(opp, to)
                .unwrap_or_else(|| panic!("{kind:?} capture on empty square {to}"));

            position.make_capture::<S>(kind, from, to, captured);
            let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
            position.unmake_capture::<S>(kind, from, to, captured);

            report::<DIVIDE>(from, to, n);
            nodes += n;
        }
    }

    nodes
}

/// Pawn moves, partitioned by pin state. A pawn pinned on its file may
/// still push (and double push); a pawn pinned diagonally may only capture
/// towards its pinner. The mask intersection settles which concrete targets
/// remain, so each pinned partition just switches off the move class that
/// could leave its pin line.
fn pawn_moves<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    masks: &MaskSet,
    depth: u32,
) -> u64 {
    let pawns = position.board()[S::piece(PieceType::Pawn)];
    let pinned_diag = pawns & masks.pinmask_diag;
    let pinned_orth = pawns & masks.pinmask_orth;
    let unpinned = pawns & !(pinned_diag | pinned_orth);

    let mut nodes = pawn_set_moves::<S, DIVIDE, true, true>(
        position,
        lookups,
        masks.can_move_to,
        unpinned,
        depth,
    );
    nodes += pawn_set_moves::<S, DIVIDE, false, true>(
        position,
        lookups,
        masks.can_move_to & masks.pinmask_diag,
        pinned_diag,
        depth,
    );
    nodes += pawn_set_moves::<S, DIVIDE, true, false>(
        position,
        lookups,
        masks.can_move_to & masks.pinmask_orth,
        pinned_orth,
        depth,
    );

    nodes
}

fn pawn_set_moves<S: Side, const DIVIDE: bool, const PUSHES: bool, const CAPTURES: bool>(
    position: &mut Position,
    lookups: &Lookups,
    targets_mask: Bitboard,
    pawns: Bitboard,
    depth: u32,
) -> u64 {
    let occupied = position.board().occupied();
    let quiet_targets = if PUSHES {
        targets_mask & !occupied
    } else {
        Bitboard::EMPTY
    };
    let capture_targets = if CAPTURES {
        targets_mask & position.board()[<S::Opp as Side>::COLOR]
    } else {
        Bitboard::EMPTY
    };

    let mut nodes = 0;

    if PUSHES {
        let starters = pawns & S::PAWN_START;
        nodes += double_pushes::<S, DIVIDE>(position, lookups, targets_mask, starters, depth);
    }

    let promoters = pawns & S::PROMOTION_FROM;
    nodes += promotions::<S, DIVIDE>(
        position,
        lookups,
        quiet_targets,
        capture_targets,
        promoters,
        depth,
    );

    let movers = pawns & !promoters;

    if depth <= 1 && !DIVIDE {
        // Single pushes in bulk; the forward shift maps pawns to targets
        // one to one. Captures go pawn by pawn, two pawns can share one
        // target square.
        nodes += (S::pawn_push(movers) & quiet_targets).pop_count() as u64;
        if CAPTURES {
            for from in movers.squares() {
                let attacks = S::pawn_attacks(Bitboard::from_square(from));
                nodes += (attacks & capture_targets).pop_count() as u64;
            }
        }
        return nodes;
    }

    let opp = <S::Opp as Side>::COLOR;
    for from in movers.squares() {
        let from_bb = Bitboard::from_square(from);

        for to in (S::pawn_push(from_bb) & quiet_targets).squares() {
            position.make_plain::<S>(PieceType::Pawn, from, to);
            let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
            position.unmake_plain::<S>(PieceType::Pawn, from, to);

            report::<DIVIDE>(from, to, n);
            nodes += n;
        }

        for to in (S::pawn_attacks(from_bb) & capture_targets).squares() {
            let captured = position
                .board()
                .piece_type_at(opp, to)
                .unwrap_or_else(|| panic!("pawn capture on empty square {to}"));

            position.make_capture::<S>(PieceType::Pawn, from, to, captured);
            let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
            position.unmake_capture::<S>(PieceType::Pawn, from, to, captured);

            report::<DIVIDE>(from, to, n);
            nodes += n;
        }
    }

    nodes
}

fn double_pushes<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    targets_mask: Bitboard,
    starters: Bitboard,
    depth: u32,
) -> u64 {
    let occupied = position.board().occupied();

    if depth <= 1 && !DIVIDE {
        return (S::pawn_double_push(starters, occupied) & targets_mask).pop_count() as u64;
    }

    let mut nodes = 0;
    for from in starters.squares() {
        let from_bb = Bitboard::from_square(from);
        let targets = S::pawn_double_push(from_bb, occupied) & targets_mask;

        for to in targets.squares() {
            position.make_pawn_double::<S>(from, to);
            let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
            position.unmake_pawn_double::<S>(from, to);

            report::<DIVIDE>(from, to, n);
            nodes += n;
        }
    }

    nodes
}

/// Promotions enumerate all four replacement pieces per reachable target.
/// The masks already settle legality, but the fan-out to four pieces keeps
/// this off the plain popcount path.
fn promotions<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    quiet_targets: Bitboard,
    capture_targets: Bitboard,
    promoters: Bitboard,
    depth: u32,
) -> u64 {
    let mut nodes = 0;
    let opp = <S::Opp as Side>::COLOR;

    for from in promoters.squares() {
        let from_bb = Bitboard::from_square(from);
        let pushes = S::pawn_push(from_bb) & quiet_targets;
        let captures = S::pawn_attacks(from_bb) & capture_targets;

        if depth <= 1 && !DIVIDE {
            nodes += 4 * (pushes | captures).pop_count() as u64;
            continue;
        }

        for to in pushes.squares() {
            for kind in PROMOTION_KINDS {
                position.make_promotion::<S>(kind, from, to, None);
                let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
                position.unmake_promotion::<S>(kind, from, to, None);

                report::<DIVIDE>(from, to, n);
                nodes += n;
            }
        }

        for to in captures.squares() {
            let captured = position
                .board()
                .piece_type_at(opp, to)
                .unwrap_or_else(|| panic!("promotion capture on empty square {to}"));

            for kind in PROMOTION_KINDS {
                position.make_promotion::<S>(kind, from, to, Some(captured));
                let n = count_moves::<S::Opp, false>(position, lookups, depth - 1);
                position.unmake_promotion::<S>(kind, from, to, Some(captured));

                report::<DIVIDE>(from, to, n);
                nodes += n;
            }
        }
    }

    nodes
}

/// En passant sidesteps the mask machinery entirely. Removing two pawns
/// from one rank can uncover a rook or queen the pin masks never saw, so
/// each capture is made on the board and the king probed directly.
fn en_passant_moves<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    king: Square,
    depth: u32,
) -> u64 {
    let state = *position.state();
    if state.en_passant() == 0 {
        return 0;
    }

    let file = state.en_passant_file();
    let victim = Square::from_u8_unchecked(S::EP_VICTIM_BASE + file);
    let to = victim.offset(S::PUSH_OFFSET);

    let mut nodes = 0;
    if state.en_passant_west() {
        nodes +=
            en_passant_capture::<S, DIVIDE>(position, lookups, king, victim.offset(-1), to, depth);
    }
    if state.en_passant_east() {
        nodes +=
            en_passant_capture::<S, DIVIDE>(position, lookups, king, victim.offset(1), to, depth);
    }

    nodes
}

fn en_passant_capture<S: Side, const DIVIDE: bool>(
    position: &mut Position,
    lookups: &Lookups,
    king: Square,
    from: Square,
    to: Square,
    depth: u32,
) -> u64 {
    position.make_en_passant::<S>(from, to);
    let n = if square_attacked_by::<S::Opp>(
        position.board(),
        position.board().occupied(),
        king,
        lookups,
    ) {
        None
    } else {
        Some(count_moves::<S::Opp, false>(position, lookups, depth - 1))
    };
    position.unmake_en_passant::<S>(from, to);

    match n {
        Some(n) => {
            report::<DIVIDE>(from, to, n);
            n
        }
        None => 0,
    }
}
