//! Board state: piece placement, game state, and the make/unmake protocol.

mod bitboard;
mod board_repr;
mod castling;
mod fen;
mod game_state;
mod piece;
mod square;

pub use bitboard::{Bitboard, ParseBitboardError};
pub use board_repr::BoardRepr;
pub use castling::{
    CastleSquares, Castling, CASTLES, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE,
    CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};
pub use fen::FenParseError;
pub use game_state::{GameState, EP_EAST, EP_WEST};
pub use piece::{Color, Piece, PieceType};
pub use square::{ParseSquareError, Square};

use arrayvec::ArrayVec;

use crate::move_gen::{square_attacked_by, Lookups, Side};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Deepest supported make/unmake nesting.
pub const MAX_PLY: usize = 128;

/// A full chess position, mutated in place.
///
/// Combines the piece placement with the current [`GameState`] and a history
/// stack of previous game states. Making a move pushes the state that the
/// move destroys (castling rights, the en passant flag, the move counters)
/// and applies incremental board mutations; unmaking applies the inverse
/// mutations and pops the stack. Each `make_*` method has an `unmake_*`
/// counterpart taking the same arguments, and an unmake must exactly follow
/// its make; pairs nest strictly.
///
/// The move family methods trust their arguments. Handing them squares that
/// do not hold the pieces they imply corrupts the position silently; the
/// move generator only derives arguments from the position itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: BoardRepr,
    state: GameState,
    history: ArrayVec<GameState, MAX_PLY>,
}

impl Position {
    pub fn new(board: BoardRepr, state: GameState) -> Self {
        Self {
            board,
            state,
            history: ArrayVec::new(),
        }
    }

    /// The standard starting position.
    pub fn starting_position() -> Self {
        Self::try_parse_fen(STARTING_POSITION_FEN).unwrap()
    }

    /// Builds a position from Forsyth-Edwards Notation.
    pub fn try_parse_fen(input: &str) -> Result<Self, FenParseError> {
        fen::parse(input)
    }

    /// The FEN string of the current position.
    pub fn fen(&self) -> String {
        fen::format(self)
    }

    pub fn board(&self) -> &BoardRepr {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn to_move(&self) -> Color {
        self.state.to_move()
    }

    /// Whether any piece of colour `S` attacks the given square.
    pub fn attacked_by<S: Side>(&self, square: Square) -> bool {
        square_attacked_by::<S>(
            &self.board,
            self.board.occupied(),
            square,
            Lookups::get_instance(),
        )
    }

    /// Moves a piece of side `S` to an empty square.
    pub fn make_plain<S: Side>(&mut self, kind: PieceType, from: Square, to: Square) {
        self.push_state();
        if kind == PieceType::Pawn {
            self.state.reset_halfmove_clock();
        }
        self.retire_rights_for_move::<S>(kind, from);
        self.board.move_piece(S::piece(kind), from, to);
    }

    pub fn unmake_plain<S: Side>(&mut self, kind: PieceType, from: Square, to: Square) {
        self.board.move_piece(S::piece(kind), to, from);
        self.pop_state();
    }

    /// Moves a piece of side `S` onto an enemy piece, removing it.
    pub fn make_capture<S: Side>(
        &mut self,
        kind: PieceType,
        from: Square,
        to: Square,
        captured: PieceType,
    ) {
        self.push_state();
        self.state.reset_halfmove_clock();
        self.retire_rights_for_move::<S>(kind, from);
        self.retire_rights_for_capture::<S>(captured, to);
        self.board.remove(<S::Opp as Side>::piece(captured), to);
        self.board.move_piece(S::piece(kind), from, to);
    }

    pub fn unmake_capture<S: Side>(
        &mut self,
        kind: PieceType,
        from: Square,
        to: Square,
        captured: PieceType,
    ) {
        self.board.move_piece(S::piece(kind), to, from);
        self.board.add(<S::Opp as Side>::piece(captured), to);
        self.pop_state();
    }

    /// Performs the castle identified by `code` (an index into [`CASTLES`])
    /// and retires both of the side's castling rights.
    pub fn make_castle<S: Side>(&mut self, code: usize) {
        let castle = &CASTLES[code];
        self.push_state();
        self.state.remove_rights(S::CASTLE_RIGHTS);
        self.board
            .move_piece(S::piece(PieceType::King), castle.king_from, castle.king_to);
        self.board
            .move_piece(S::piece(PieceType::Rook), castle.rook_from, castle.rook_to);
    }

    pub fn unmake_castle<S: Side>(&mut self, code: usize) {
        let castle = &CASTLES[code];
        self.board
            .move_piece(S::piece(PieceType::King), castle.king_to, castle.king_from);
        self.board
            .move_piece(S::piece(PieceType::Rook), castle.rook_to, castle.rook_from);
        self.pop_state();
    }

    /// Pushes a pawn two ranks forward and publishes the en passant flag
    /// when an enemy pawn stands next to the arrival square.
    pub fn make_pawn_double<S: Side>(&mut self, from: Square, to: Square) {
        self.push_state();
        self.state.reset_halfmove_clock();
        self.board.move_piece(S::piece(PieceType::Pawn), from, to);

        let file = to.file();
        let enemy_pawns = self.board[<S::Opp as Side>::piece(PieceType::Pawn)];
        let west = file > 0 && enemy_pawns.get(to.offset(-1));
        let east = file < 7 && enemy_pawns.get(to.offset(1));
        if west || east {
            self.state.set_en_passant(west, east, file);
        }
    }

    pub fn unmake_pawn_double<S: Side>(&mut self, from: Square, to: Square) {
        self.board.move_piece(S::piece(PieceType::Pawn), to, from);
        self.pop_state();
    }

    /// Captures en passant: the moving pawn lands on `to`, the captured pawn
    /// disappears from the square the capturer started beside.
    pub fn make_en_passant<S: Side>(&mut self, from: Square, to: Square) {
        self.push_state();
        self.state.reset_halfmove_clock();
        let victim = to.offset(-S::PUSH_OFFSET);
        self.board.move_piece(S::piece(PieceType::Pawn), from, to);
        self.board
            .remove(<S::Opp as Side>::piece(PieceType::Pawn), victim);
    }

    pub fn unmake_en_passant<S: Side>(&mut self, from: Square, to: Square) {
        let victim = to.offset(-S::PUSH_OFFSET);
        self.board.move_piece(S::piece(PieceType::Pawn), to, from);
        self.board
            .add(<S::Opp as Side>::piece(PieceType::Pawn), victim);
        self.pop_state();
    }

    /// Promotes the pawn on `from` to `new_kind` on `to`, capturing
    /// whatever `captured` names.
    pub fn make_promotion<S: Side>(
        &mut self,
        new_kind: PieceType,
        from: Square,
        to: Square,
        captured: Option<PieceType>,
    ) {
        self.push_state();
        self.state.reset_halfmove_clock();
        if let Some(captured) = captured {
            self.retire_rights_for_capture::<S>(captured, to);
            self.board.remove(<S::Opp as Side>::piece(captured), to);
        }
        self.board.remove(S::piece(PieceType::Pawn), from);
        self.board.add(S::piece(new_kind), to);
    }

    pub fn unmake_promotion<S: Side>(
        &mut self,
        new_kind: PieceType,
        from: Square,
        to: Square,
        captured: Option<PieceType>,
    ) {
        self.board.remove(S::piece(new_kind), to);
        self.board.add(S::piece(PieceType::Pawn), from);
        if let Some(captured) = captured {
            self.board.add(<S::Opp as Side>::piece(captured), to);
        }
        self.pop_state();
    }

    fn push_state(&mut self) {
        self.history.push(self.state);
        self.state.begin_ply();
    }

    fn pop_state(&mut self) {
        self.state = self
            .history
            .pop()
            .expect("unmake without a matching make");
    }

    /// A king move retires both of its side's castling rights; a rook
    /// leaving its home square retires that wing's.
    fn retire_rights_for_move<S: Side>(&mut self, kind: PieceType, from: Square) {
        match kind {
            PieceType::King => self.state.remove_rights(S::CASTLE_RIGHTS),
            PieceType::Rook => {
                if from == S::KINGSIDE_ROOK_HOME {
                    self.state.remove_rights(S::KINGSIDE_RIGHT);
                } else if from == S::QUEENSIDE_ROOK_HOME {
                    self.state.remove_rights(S::QUEENSIDE_RIGHT);
                }
            }
            _ => {}
        }
    }

    /// Capturing a rook on its home square retires the victim's right for
    /// that wing, whether or not it ever moved.
    fn retire_rights_for_capture<S: Side>(&mut self, captured: PieceType, to: Square) {
        if captured == PieceType::Rook {
            if to == <S::Opp as Side>::KINGSIDE_ROOK_HOME {
                self.state
                    .remove_rights(<S::Opp as Side>::KINGSIDE_RIGHT);
            } else if to == <S::Opp as Side>::QUEENSIDE_ROOK_HOME {
                self.state
                    .remove_rights(<S::Opp as Side>::QUEENSIDE_RIGHT);
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting_position()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::move_gen::{Black, White};
    use pretty_assertions::assert_eq;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn plain_move_round_trips() {
        let original = Position::starting_position();
        let mut position = original.clone();

        position.make_plain::<White>(PieceType::Knight, sq("g1"), sq("f3"));
        assert_eq!(position.to_move(), Color::Black);
        assert_eq!(position.board().piece_at(sq("g1")), None);
        assert_eq!(
            position.board().piece_at(sq("f3")),
            Some(Piece::WHITE_KNIGHT)
        );
        assert_eq!(position.state().halfmove_clock(), 1);

        position.unmake_plain::<White>(PieceType::Knight, sq("g1"), sq("f3"));
        assert_eq!(position, original);
    }

    #[test]
    fn capture_round_trips() {
        let original =
            Position::try_parse_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let mut position = original.clone();

        position.make_capture::<White>(PieceType::Pawn, sq("e4"), sq("d5"), PieceType::Pawn);
        assert_eq!(
            position.board().piece_at(sq("d5")),
            Some(Piece::WHITE_PAWN)
        );
        assert_eq!(position.state().halfmove_clock(), 0);

        position.unmake_capture::<White>(PieceType::Pawn, sq("e4"), sq("d5"), PieceType::Pawn);
        assert_eq!(position, original);
    }

    #[test]
    fn castles_move_both_pieces_and_round_trip() {
        let original =
            Position::try_parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        let mut position = original.clone();
        position.make_castle::<White>(CASTLE_WHITE_KINGSIDE);
        assert_eq!(position.board().piece_at(sq("g1")), Some(Piece::WHITE_KING));
        assert_eq!(position.board().piece_at(sq("f1")), Some(Piece::WHITE_ROOK));
        assert_eq!(position.board().piece_at(sq("e1")), None);
        assert_eq!(position.board().piece_at(sq("h1")), None);
        assert_eq!(position.state().castling(), Castling::BLACK);
        position.unmake_castle::<White>(CASTLE_WHITE_KINGSIDE);
        assert_eq!(position, original);

        let mut position = original.clone();
        position.make_castle::<White>(CASTLE_WHITE_QUEENSIDE);
        assert_eq!(position.board().piece_at(sq("c1")), Some(Piece::WHITE_KING));
        assert_eq!(position.board().piece_at(sq("d1")), Some(Piece::WHITE_ROOK));
        position.unmake_castle::<White>(CASTLE_WHITE_QUEENSIDE);
        assert_eq!(position, original);
    }

    #[test]
    fn king_and_rook_moves_retire_rights() {
        let base = Position::try_parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        let mut position = base.clone();
        position.make_plain::<White>(PieceType::King, sq("e1"), sq("e2"));
        assert_eq!(position.state().castling(), Castling::BLACK);
        position.unmake_plain::<White>(PieceType::King, sq("e1"), sq("e2"));
        assert_eq!(position, base);

        let mut position = base.clone();
        position.make_plain::<White>(PieceType::Rook, sq("h1"), sq("h5"));
        assert_eq!(
            position.state().castling(),
            Castling::WHITE_QUEENSIDE | Castling::BLACK
        );
        position.unmake_plain::<White>(PieceType::Rook, sq("h1"), sq("h5"));
        assert_eq!(position, base);

        // Moving a rook back to its home square does not restore the right.
        let mut position = base.clone();
        position.make_plain::<White>(PieceType::Rook, sq("a1"), sq("a4"));
        position.make_plain::<Black>(PieceType::Rook, sq("a8"), sq("a6"));
        position.make_plain::<White>(PieceType::Rook, sq("a4"), sq("a1"));
        assert_eq!(
            position.state().castling(),
            Castling::WHITE_KINGSIDE | Castling::BLACK_KINGSIDE
        );
    }

    #[test]
    fn rook_captures_retire_the_victims_rights() {
        let base =
            Position::try_parse_fen("r3k2r/8/8/8/8/6n1/8/R3K2R b KQkq - 0 1").unwrap();

        let mut position = base.clone();
        position.make_capture::<Black>(PieceType::Knight, sq("g3"), sq("h1"), PieceType::Rook);
        assert_eq!(
            position.state().castling(),
            Castling::WHITE_QUEENSIDE | Castling::BLACK
        );
        position.unmake_capture::<Black>(PieceType::Knight, sq("g3"), sq("h1"), PieceType::Rook);
        assert_eq!(position, base);
    }

    #[test]
    fn double_push_publishes_en_passant_when_capturable() {
        let base =
            Position::try_parse_fen("4k3/8/8/8/1p3p2/8/P1P1P3/4K3 w - - 0 1").unwrap();

        // Both neighbours of c4 hold black pawns.
        let mut position = base.clone();
        position.make_pawn_double::<White>(sq("c2"), sq("c4"));
        assert!(position.state().en_passant_west());
        assert!(position.state().en_passant_east());
        assert_eq!(position.state().en_passant_file(), 2);
        position.unmake_pawn_double::<White>(sq("c2"), sq("c4"));
        assert_eq!(position, base);

        // Only f4, the east neighbour of e4, holds a black pawn.
        let mut position = base.clone();
        position.make_pawn_double::<White>(sq("e2"), sq("e4"));
        assert!(!position.state().en_passant_west());
        assert!(position.state().en_passant_east());
        assert_eq!(position.state().en_passant_file(), 4);
        position.unmake_pawn_double::<White>(sq("e2"), sq("e4"));
        assert_eq!(position, base);

        // No adjacent enemy pawn: the flag stays clear.
        let mut position = base.clone();
        position.make_pawn_double::<White>(sq("a2"), sq("a4"));
        assert_eq!(position.state().en_passant(), 0);
    }

    #[test]
    fn en_passant_removes_the_bypassed_pawn() {
        let original =
            Position::try_parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let mut position = original.clone();

        position.make_en_passant::<White>(sq("e5"), sq("d6"));
        assert_eq!(position.board().piece_at(sq("d6")), Some(Piece::WHITE_PAWN));
        assert_eq!(position.board().piece_at(sq("d5")), None);
        assert_eq!(position.board().piece_at(sq("e5")), None);

        position.unmake_en_passant::<White>(sq("e5"), sq("d6"));
        assert_eq!(position, original);
    }

    #[test]
    fn promotions_round_trip_with_and_without_capture() {
        let original =
            Position::try_parse_fen("3r3k/2P5/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        let mut position = original.clone();
        position.make_promotion::<White>(PieceType::Queen, sq("c7"), sq("c8"), None);
        assert_eq!(
            position.board().piece_at(sq("c8")),
            Some(Piece::WHITE_QUEEN)
        );
        assert_eq!(position.board().piece_at(sq("c7")), None);
        position.unmake_promotion::<White>(PieceType::Queen, sq("c7"), sq("c8"), None);
        assert_eq!(position, original);

        let mut position = original.clone();
        position.make_promotion::<White>(
            PieceType::Knight,
            sq("c7"),
            sq("d8"),
            Some(PieceType::Rook),
        );
        assert_eq!(
            position.board().piece_at(sq("d8")),
            Some(Piece::WHITE_KNIGHT)
        );
        position.unmake_promotion::<White>(
            PieceType::Knight,
            sq("c7"),
            sq("d8"),
            Some(PieceType::Rook),
        );
        assert_eq!(position, original);
    }

    #[test]
    fn promotion_capture_on_a_rook_home_retires_rights() {
        let mut position =
            Position::try_parse_fen("r3k3/1P6/8/8/8/8/8/4K3 w q - 0 1").unwrap();

        position.make_promotion::<White>(
            PieceType::Queen,
            sq("b7"),
            sq("a8"),
            Some(PieceType::Rook),
        );
        assert_eq!(position.state().castling(), Castling::empty());
    }

    #[test]
    fn nested_moves_unwind_in_reverse_order() {
        let original = Position::starting_position();
        let mut position = original.clone();

        position.make_pawn_double::<White>(sq("e2"), sq("e4"));
        position.make_pawn_double::<Black>(sq("d7"), sq("d5"));
        position.make_capture::<White>(PieceType::Pawn, sq("e4"), sq("d5"), PieceType::Pawn);
        position.make_plain::<Black>(PieceType::Queen, sq("d8"), sq("d5"));

        assert_eq!(position.state().fullmoves(), 3);

        position.unmake_plain::<Black>(PieceType::Queen, sq("d8"), sq("d5"));
        position.unmake_capture::<White>(PieceType::Pawn, sq("e4"), sq("d5"), PieceType::Pawn);
        position.unmake_pawn_double::<Black>(sq("d7"), sq("d5"));
        position.unmake_pawn_double::<White>(sq("e2"), sq("e4"));

        assert_eq!(position, original);
    }

    #[test]
    fn attacked_by_follows_the_mutated_board() {
        let mut position =
            Position::try_parse_fen("4r3/8/8/8/8/8/4K3/7k w - - 0 1").unwrap();

        // e2 is attacked through the file; once the king steps aside the
        // square behind it opens up too.
        assert!(position.attacked_by::<Black>(sq("e2")));
        assert!(!position.attacked_by::<White>(sq("e8")));

        position.make_plain::<White>(PieceType::King, sq("e2"), sq("d2"));
        assert!(position.attacked_by::<Black>(sq("e1")));
        assert!(position.attacked_by::<Black>(sq("e2")));
    }

    #[test]
    fn black_queen_capture_by_black_works_from_fen() {
        // A black move family sanity check on a mid-game position.
        let original = Position::try_parse_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2",
        )
        .unwrap();
        let mut position = original.clone();

        position.make_capture::<Black>(PieceType::Pawn, sq("d5"), sq("e4"), PieceType::Pawn);
        assert_eq!(position.board().piece_at(sq("e4")), Some(Piece::BLACK_PAWN));
        assert_eq!(position.to_move(), Color::White);
        assert_eq!(position.state().fullmoves(), 3);

        position.unmake_capture::<Black>(PieceType::Pawn, sq("d5"), sq("e4"), PieceType::Pawn);
        assert_eq!(position, original);
    }
}
