//! Forsyth-Edwards Notation parsing and printing.

use thiserror::Error;

use crate::move_gen::{Black, Side, White};

use super::{
    BoardRepr, Castling, Color, GameState, Piece, PieceType, Position, Square, EP_EAST, EP_WEST,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    #[error("expected 6 space-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("invalid piece placement field")]
    InvalidPlacement,
    #[error("invalid side to move `{0}`")]
    InvalidSideToMove(String),
    #[error("invalid castling field `{0}`")]
    InvalidCastling(String),
    #[error("invalid en passant field `{0}`")]
    InvalidEnPassant(String),
    #[error("invalid move counter `{0}`")]
    InvalidCounter(String),
}

pub(super) fn parse(input: &str) -> Result<Position, FenParseError> {
    let fields: Vec<_> = input.split_whitespace().collect();
    let &[placement, to_move, castling, en_passant, halfmove_clock, fullmoves] = &fields[..]
    else {
        return Err(FenParseError::WrongFieldCount(fields.len()));
    };

    let board = parse_placement(placement)?;

    let to_move = match to_move {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenParseError::InvalidSideToMove(other.to_owned())),
    };

    let castling = parse_castling(castling)?;

    let en_passant = match en_passant {
        "-" => 0,
        other => {
            let target: Square = other
                .parse()
                .map_err(|_| FenParseError::InvalidEnPassant(other.to_owned()))?;
            en_passant_flag(&board, to_move, target)
        }
    };

    let halfmove_clock = halfmove_clock
        .parse()
        .map_err(|_| FenParseError::InvalidCounter(halfmove_clock.to_owned()))?;
    let fullmoves = fullmoves
        .parse()
        .map_err(|_| FenParseError::InvalidCounter(fullmoves.to_owned()))?;

    Ok(Position::new(
        board,
        GameState::new(to_move, castling, en_passant, halfmove_clock, fullmoves),
    ))
}

fn parse_placement(placement: &str) -> Result<BoardRepr, FenParseError> {
    let ranks: Vec<_> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenParseError::InvalidPlacement);
    }

    let mut board = [None; 64];
    for (rank_index, rank_pieces) in ranks.into_iter().enumerate() {
        let rank = 7 - rank_index as u8;
        let mut file = 0u8;

        for c in rank_pieces.chars() {
            if let Some(digit) = c.to_digit(10) {
                file += digit as u8;
            } else {
                let piece =
                    Piece::try_from_fen_char(c).ok_or(FenParseError::InvalidPlacement)?;
                if file >= 8 {
                    return Err(FenParseError::InvalidPlacement);
                }
                board[Square::new_unchecked(rank, file).index()] = Some(piece);
                file += 1;
            }

            if file > 8 {
                return Err(FenParseError::InvalidPlacement);
            }
        }

        if file != 8 {
            return Err(FenParseError::InvalidPlacement);
        }
    }

    Ok(BoardRepr::new(&board))
}

fn parse_castling(field: &str) -> Result<Castling, FenParseError> {
    if field == "-" {
        return Ok(Castling::empty());
    }

    let mut flags = Castling::empty();
    for c in field.chars() {
        flags |= match c {
            'K' => Castling::WHITE_KINGSIDE,
            'Q' => Castling::WHITE_QUEENSIDE,
            'k' => Castling::BLACK_KINGSIDE,
            'q' => Castling::BLACK_QUEENSIDE,
            _ => return Err(FenParseError::InvalidCastling(field.to_owned())),
        };
    }
    Ok(flags)
}

/// Converts a FEN en passant target square into the packed flag byte.
///
/// FEN names the square behind the double-pushed pawn; the flag instead
/// records which neighbours of that pawn can actually capture it. Probing
/// the board here means a FEN that names a target square nobody can attack
/// parses to the same state the double-push itself would have produced.
fn en_passant_flag(board: &BoardRepr, to_move: Color, target: Square) -> u8 {
    fn flag_for<S: Side>(board: &BoardRepr, target: Square) -> u8 {
        let file = target.file();
        let victim = Square::from_u8_unchecked(S::EP_VICTIM_BASE + file);

        if !board[<S::Opp as Side>::piece(PieceType::Pawn)].get(victim) {
            return 0;
        }

        let capturers = board[S::piece(PieceType::Pawn)];
        let west = file > 0 && capturers.get(victim.offset(-1));
        let east = file < 7 && capturers.get(victim.offset(1));

        if west || east {
            (west as u8) * EP_WEST | (east as u8) * EP_EAST | file
        } else {
            0
        }
    }

    match to_move {
        Color::White => flag_for::<White>(board, target),
        Color::Black => flag_for::<Black>(board, target),
    }
}

pub(super) fn format(position: &Position) -> String {
    let mut result = String::new();

    for rank in (0..8).rev() {
        let mut empty_squares = 0;
        for file in 0..8 {
            let square = Square::new_unchecked(rank, file);
            match position.board().piece_at(square) {
                None => empty_squares += 1,
                Some(piece) => {
                    if empty_squares > 0 {
                        result.push((empty_squares + b'0') as char);
                    }
                    result.push(piece.as_fen_char());
                    empty_squares = 0;
                }
            }
        }
        if empty_squares > 0 {
            result.push((empty_squares + b'0') as char);
        }
        if rank > 0 {
            result.push('/');
        }
    }

    let state = position.state();

    result.push(' ');
    result.push(if state.to_move().is_white() { 'w' } else { 'b' });
    result.push(' ');
    result.push_str(&state.castling().as_fen_str());
    result.push(' ');
    match en_passant_target(position) {
        Some(square) => result.push_str(&square.to_string()),
        None => result.push('-'),
    }
    result.push(' ');
    result.push_str(&state.halfmove_clock().to_string());
    result.push(' ');
    result.push_str(&state.fullmoves().to_string());

    result
}

/// The square behind the double-pushed pawn, reconstructed from the flag.
fn en_passant_target(position: &Position) -> Option<Square> {
    let state = position.state();
    if state.en_passant() == 0 {
        return None;
    }

    let file = state.en_passant_file();
    let (base, push) = match state.to_move() {
        Color::White => (White::EP_VICTIM_BASE, White::PUSH_OFFSET),
        Color::Black => (Black::EP_VICTIM_BASE, Black::PUSH_OFFSET),
    };
    Some(Square::from_u8_unchecked(base + file).offset(push))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::STARTING_POSITION_FEN;
    use pretty_assertions::assert_eq;

    #[test]
    fn starting_position_round_trips() {
        let position = Position::try_parse_fen(STARTING_POSITION_FEN).unwrap();
        assert_eq!(position.fen(), STARTING_POSITION_FEN);

        assert_eq!(position.to_move(), Color::White);
        assert_eq!(position.state().castling(), Castling::all());
        assert_eq!(position.state().en_passant(), 0);
        assert_eq!(
            position.board().piece_at("e1".parse().unwrap()),
            Some(Piece::WHITE_KING)
        );
        assert_eq!(
            position.board().piece_at("d8".parse().unwrap()),
            Some(Piece::BLACK_QUEEN)
        );
        assert_eq!(position.board().occupied().pop_count(), 32);
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let position = Position::try_parse_fen(fen).unwrap();
        assert_eq!(position.fen(), fen);
    }

    #[test]
    fn en_passant_field_becomes_a_capturer_flag() {
        // Black d5 pawn can take the c4 pawn from the east.
        let position =
            Position::try_parse_fen("4k3/8/8/8/2Pp4/8/8/4K3 b - c3 0 1").unwrap();
        assert!(!position.state().en_passant_west());
        assert!(position.state().en_passant_east());
        assert_eq!(position.state().en_passant_file(), 2);
        assert_eq!(position.fen(), "4k3/8/8/8/2Pp4/8/8/4K3 b - c3 0 1");

        // Capturers on both sides.
        let position =
            Position::try_parse_fen("4k3/8/8/2PpP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert!(position.state().en_passant_west());
        assert!(position.state().en_passant_east());
        assert_eq!(position.state().en_passant_file(), 3);

        // Nobody can capture: the flag collapses to empty.
        let position =
            Position::try_parse_fen("4k3/8/8/8/3p4/8/8/4K3 b - c3 0 1").unwrap();
        assert_eq!(position.state().en_passant(), 0);
        assert_eq!(position.fen(), "4k3/8/8/8/3p4/8/8/4K3 b - - 0 1");
    }

    #[test]
    fn counters_are_preserved() {
        let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
        let position = Position::try_parse_fen(fen).unwrap();
        assert_eq!(position.state().halfmove_clock(), 1);
        assert_eq!(position.state().fullmoves(), 8);
        assert_eq!(position.fen(), fen);
    }

    #[test]
    fn malformed_fens_are_rejected() {
        assert_eq!(
            Position::try_parse_fen("only three fields"),
            Err(FenParseError::WrongFieldCount(3))
        );
        assert!(matches!(
            Position::try_parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1"),
            Err(FenParseError::InvalidPlacement)
        ));
        assert!(matches!(
            Position::try_parse_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::InvalidPlacement)
        ));
        assert!(matches!(
            Position::try_parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(FenParseError::InvalidSideToMove(_))
        ));
        assert!(matches!(
            Position::try_parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KX - 0 1"),
            Err(FenParseError::InvalidCastling(_))
        ));
        assert!(matches!(
            Position::try_parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1"),
            Err(FenParseError::InvalidEnPassant(_))
        ));
        assert!(matches!(
            Position::try_parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1"),
            Err(FenParseError::InvalidCounter(_))
        ));
    }
}
