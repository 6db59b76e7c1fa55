//! Attack detection against the live board
//!
//! Probes the padded square array directly; the border squares hold
//! `OFFBOARD`, so no offset walk needs a bounds check.

use crate::board::Board;
use crate::types::*;

pub const KNIGHT_DIRECTIONS: [isize; 8] = [-8, -19, -21, -12, 8, 19, 21, 12];
pub const ROOK_DIRECTIONS: [isize; 4] = [-1, -10, 1, 10];
pub const BISHOP_DIRECTIONS: [isize; 4] = [-9, -11, 11, 9];
pub const KING_DIRECTIONS: [isize; 8] = [-1, -10, 1, 10, -9, -11, 11, 9];

#[inline]
pub(crate) fn offset(sq: usize, direction: isize) -> usize {
    sq.wrapping_add_signed(direction)
}

/// Check if `sq` is attacked by any piece of `by_side`
pub fn is_square_attacked(board: &Board, sq: usize, by_side: usize) -> bool {
    debug_assert!(crate::square::is_on_board(sq), "attack probe on square {}", sq);
    debug_assert!(by_side == WHITE || by_side == BLACK);

    let squares = &board.squares;

    // Pawns: a white attacker sits one rank below, a black one above
    if by_side == WHITE {
        if squares[sq - 11] == WHITE_PAWN || squares[sq - 9] == WHITE_PAWN {
            return true;
        }
    } else if squares[sq + 11] == BLACK_PAWN || squares[sq + 9] == BLACK_PAWN {
        return true;
    }

    // Knights
    for &dir in &KNIGHT_DIRECTIONS {
        let piece = squares[offset(sq, dir)];
        if piece != OFFBOARD && PIECE_KNIGHT[piece as usize] && piece_colour(piece) == by_side {
            return true;
        }
    }

    // Rooks and queens
    for &dir in &ROOK_DIRECTIONS {
        if first_piece_matches(board, sq, dir, by_side, &PIECE_ROOK_QUEEN) {
            return true;
        }
    }

    // Bishops and queens
    for &dir in &BISHOP_DIRECTIONS {
        if first_piece_matches(board, sq, dir, by_side, &PIECE_BISHOP_QUEEN) {
            return true;
        }
    }

    // Kings
    for &dir in &KING_DIRECTIONS {
        let piece = squares[offset(sq, dir)];
        if piece != OFFBOARD && PIECE_KING[piece as usize] && piece_colour(piece) == by_side {
            return true;
        }
    }

    false
}

/// Walk from `sq` along `direction` and test the first occupied square
fn first_piece_matches(
    board: &Board,
    sq: usize,
    direction: isize,
    by_side: usize,
    kinds: &[bool; PIECE_TYPES],
) -> bool {
    let mut current = offset(sq, direction);

    loop {
        let piece = board.squares[current];
        if piece == OFFBOARD {
            return false;
        }
        if piece != EMPTY {
            return kinds[piece as usize] && piece_colour(piece) == by_side;
        }
        current = offset(current, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::KIWIPETE;
    use crate::move_generator::MoveGenerator;
    use crate::moves::MoveList;
    use crate::ordering::SearchHeuristics;
    use crate::square::*;

    fn sq(name: &str) -> usize {
        parse_square(name).expect("valid square")
    }

    #[test]
    fn pawn_attacks_are_directional() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert!(is_square_attacked(&board, sq("d5"), WHITE));
        assert!(is_square_attacked(&board, sq("f5"), WHITE));
        assert!(!is_square_attacked(&board, sq("e5"), WHITE));
        assert!(is_square_attacked(&board, sq("e4"), BLACK));
        assert!(is_square_attacked(&board, sq("c4"), BLACK));
        assert!(!is_square_attacked(&board, sq("d3"), WHITE));
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let board = Board::from_fen("4k3/8/8/8/1b6/8/3P4/R3K3 w - - 0 1").expect("FEN should parse");
        // rook a1 along the first rank up to the king
        assert!(is_square_attacked(&board, sq("d1"), WHITE));
        assert!(is_square_attacked(&board, sq("a8"), WHITE));
        // bishop b4 blocked by the d2 pawn
        assert!(is_square_attacked(&board, sq("d2"), BLACK));
        assert!(!is_square_attacked(&board, sq("e1"), BLACK));
    }

    #[test]
    fn knights_and_kings() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").expect("FEN should parse");
        assert!(is_square_attacked(&board, sq("b3"), WHITE));
        assert!(is_square_attacked(&board, sq("c2"), WHITE));
        assert!(!is_square_attacked(&board, sq("c3"), WHITE));
        assert!(is_square_attacked(&board, sq("d2"), WHITE));
        assert!(is_square_attacked(&board, sq("f7"), BLACK));
        assert!(!is_square_attacked(&board, sq("e6"), BLACK));
    }

    /// A king is attacked exactly when the other side has a pseudo-legal
    /// move landing on it.
    #[test]
    fn attack_matches_king_capture() {
        let generator = MoveGenerator::new();
        let heuristics = SearchHeuristics::new();
        for fen in [
            KIWIPETE,
            "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1",
            "4k3/8/8/1B6/8/8/8/4K3 b - - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        ] {
            let board = Board::from_fen(fen).expect("FEN should parse");
            let mut flipped = board.clone();
            flipped.side ^= 1;
            flipped.en_passant = None;

            let mut list = MoveList::new();
            generator.generate_moves(&flipped, false, &heuristics, &mut list);
            let king = board.king_sq[board.side];
            let captures_king = list.iter().any(|m| m.mv.to() == king);

            assert_eq!(board.in_check(), captures_king, "{}", fen);
            assert_eq!(is_square_attacked(&board, king, board.side ^ 1), captures_king, "{}", fen);
        }
    }
}
