//! Position Evaluation Module
//!
//! Static evaluation from:
//! - Material balance
//! - Piece positioning (piece-square tables)
//! - Pawn structure (isolated and passed pawns)
//! - Rook and queen file openness
//! - King placement by game phase, and pawn shield after castling
//! - Bishop pair bonus
//!
//! Scores are centipawns. `score_from_white` is positive when white is
//! better; `evaluate` returns the score for the side to move.

use crate::bitboard::{file_bb, set_bit};
use crate::board::Board;
use crate::square::*;
use crate::types::*;

// ============================================================================
// EVALUATION BONUSES/PENALTIES
// ============================================================================

const ISOLATED_PAWN_PENALTY: i32 = -10;
const ROOK_OPEN_FILE_BONUS: i32 = 10;
const ROOK_SEMI_OPEN_FILE_BONUS: i32 = 5;
const QUEEN_OPEN_FILE_BONUS: i32 = 5;
const QUEEN_SEMI_OPEN_FILE_BONUS: i32 = 3;
const BISHOP_PAIR_BONUS: i32 = 30;
const KING_SHIELD_BONUS: i32 = 20;
const KING_SHIELD_MIN_PAWNS: u32 = 3;

/// Indexed by rank counted from the pawn's own side
const PASSED_PAWN_BONUS: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 200];

/// Opponent material at or below this switches a king to the endgame table
pub const END_GAME_LIMIT: i32 = PIECE_VALUES[WHITE_ROOK as usize]
    + 2 * PIECE_VALUES[WHITE_KNIGHT as usize]
    + 2 * PIECE_VALUES[WHITE_PAWN as usize]
    + PIECE_VALUES[WHITE_KING as usize];

// ============================================================================
// PIECE-SQUARE TABLES (a1 first, from white's side)
// ============================================================================

const PAWN_PST: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,   // Rank 1
    10,  10,   0, -10, -10,   0,  10,  10,   // Rank 2
     5,   0,   0,   5,   5,   0,   0,   5,   // Rank 3
     0,   0,  10,  20,  20,  10,   0,   0,   // Rank 4
     5,   5,   5,  10,  10,   5,   5,   5,   // Rank 5
    10,  10,  10,  20,  20,  10,  10,  10,   // Rank 6
    20,  20,  20,  30,  30,  20,  20,  20,   // Rank 7
     0,   0,   0,   0,   0,   0,   0,   0,   // Rank 8
];

const KNIGHT_PST: [i32; 64] = [
     0, -10,   0,   0,   0,   0, -10,   0,
     0,   0,   0,   5,   5,   0,   0,   0,
     0,   0,  10,  10,  10,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     5,  10,  15,  20,  20,  15,  10,   5,
     5,  10,  10,  20,  20,  10,  10,   5,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   0,   0,   0,   0,   0,   0,
];

const BISHOP_PST: [i32; 64] = [
     0,   0, -10,   0,   0, -10,   0,   0,
     0,   0,   0,  10,  10,   0,   0,   0,
     0,   0,  10,  15,  15,  10,   0,   0,
     0,  10,  15,  20,  20,  15,  10,   0,
     0,  10,  15,  20,  20,  15,  10,   0,
     0,   0,  10,  15,  15,  10,   0,   0,
     0,   0,   0,  10,  10,   0,   0,   0,
     0,   0,   0,   0,   0,   0,   0,   0,
];

const ROOK_PST: [i32; 64] = [
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
    25,  25,  25,  25,  25,  25,  25,  25,
     0,   0,   5,  10,  10,   5,   0,   0,
];

// King opening PST - stay home behind the pawns
const KING_OPENING_PST: [i32; 64] = [
     0,   5,   5, -10, -10,   0,  10,   5,
   -10, -10, -10, -10, -10, -10, -10, -10,
   -30, -30, -30, -30, -30, -30, -30, -30,
   -70, -70, -70, -70, -70, -70, -70, -70,
   -70, -70, -70, -70, -70, -70, -70, -70,
   -70, -70, -70, -70, -70, -70, -70, -70,
   -70, -70, -70, -70, -70, -70, -70, -70,
   -70, -70, -70, -70, -70, -70, -70, -70,
];

// King endgame PST - head for the centre
const KING_ENDGAME_PST: [i32; 64] = [
   -50, -10,   0,   0,   0,   0, -10, -50,
   -10,   0,  10,  10,  10,  10,   0, -10,
     0,  10,  15,  15,  15,  15,  10,   0,
     0,  10,  15,  20,  20,  15,  10,   0,
     0,  10,  15,  20,  20,  15,  10,   0,
     0,  10,  15,  15,  15,  15,  10,   0,
   -10,   0,  10,  10,  10,  10,   0, -10,
   -50, -10,   0,   0,   0,   0, -10, -50,
];

// ============================================================================
// PAWN MASKS
// ============================================================================

/// Squares on adjacent files (and its own) strictly ahead of a white pawn
pub static WHITE_PASSED_MASK: [u64; 64] = init_passed_masks(true);
/// Same for black, looking down the board
pub static BLACK_PASSED_MASK: [u64; 64] = init_passed_masks(false);
/// Both neighbouring files; empty of own pawns means isolated
pub static ISOLATED_MASK: [u64; 64] = init_isolated_masks();

const fn init_passed_masks(white: bool) -> [u64; 64] {
    let mut masks = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let (file, rank) = ((sq % 8) as i32, (sq / 8) as i32);
        let mut target = 0usize;
        while target < 64 {
            let (t_file, t_rank) = ((target % 8) as i32, (target / 8) as i32);
            let ahead = if white { t_rank > rank } else { t_rank < rank };
            if ahead && (t_file - file).abs() <= 1 {
                masks[sq] |= 1u64 << target;
            }
            target += 1;
        }
        sq += 1;
    }

    masks
}

const fn init_isolated_masks() -> [u64; 64] {
    let mut masks = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = sq % 8;
        if file > FILE_A {
            masks[sq] |= file_bb(file - 1);
        }
        if file < FILE_H {
            masks[sq] |= file_bb(file + 1);
        }
        sq += 1;
    }

    masks
}

/// Six squares two ranks deep in front of a king castled on `king_sq`
fn king_shield_mask(king_sq: usize) -> Option<u64> {
    let (file, ranks) = match king_sq {
        G1 => (6, [1, 2]),
        C1 => (2, [1, 2]),
        G8 => (6, [6, 5]),
        C8 => (2, [6, 5]),
        _ => return None,
    };

    let mut mask = 0u64;
    for rank in ranks {
        for f in file - 1..=file + 1 {
            set_bit(&mut mask, rank * 8 + f);
        }
    }
    Some(mask)
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Known insufficient-material patterns, pawnless only
pub fn is_material_draw(board: &Board) -> bool {
    if board.pawns[BOTH] != 0 {
        return false;
    }

    let n = |piece: u8| board.piece_count[piece as usize];
    let (w_n, b_n) = (n(WHITE_KNIGHT), n(BLACK_KNIGHT));
    let (w_b, b_b) = (n(WHITE_BISHOP), n(BLACK_BISHOP));
    let (w_r, b_r) = (n(WHITE_ROOK), n(BLACK_ROOK));
    let (w_q, b_q) = (n(WHITE_QUEEN), n(BLACK_QUEEN));
    let minors = board.minor_pieces;

    if w_r == 0 && b_r == 0 && w_q == 0 && b_q == 0 {
        if w_b == 0 && b_b == 0 {
            return w_n < 3 && b_n < 3;
        }
        if w_n == 0 && b_n == 0 {
            return w_b.abs_diff(b_b) < 2;
        }
        let weak = |knights: usize, bishops: usize| (knights < 3 && bishops == 0) || (bishops == 1 && knights == 0);
        return weak(w_n, w_b) && weak(b_n, b_b);
    }

    if w_q == 0 && b_q == 0 {
        return match (w_r, b_r) {
            (1, 1) => minors[WHITE] < 2 && minors[BLACK] < 2,
            (1, 0) => minors[WHITE] == 0 && (1..=2).contains(&minors[BLACK]),
            (0, 1) => minors[BLACK] == 0 && (1..=2).contains(&minors[WHITE]),
            _ => false,
        };
    }

    false
}

/// Evaluate the position from the side to move's point of view
pub fn evaluate(board: &Board) -> i32 {
    let score = score_from_white(board);
    if board.side == WHITE {
        score
    } else {
        -score
    }
}

/// Evaluate the position, positive when white is better
pub fn score_from_white(board: &Board) -> i32 {
    if is_material_draw(board) {
        return 0;
    }

    let mut score = board.material[WHITE] - board.material[BLACK];

    score += pawn_score(board, WHITE) - pawn_score(board, BLACK);

    score += table_score(board, WHITE_KNIGHT, &KNIGHT_PST) - table_score(board, BLACK_KNIGHT, &KNIGHT_PST);
    score += table_score(board, WHITE_BISHOP, &BISHOP_PST) - table_score(board, BLACK_BISHOP, &BISHOP_PST);
    score += table_score(board, WHITE_ROOK, &ROOK_PST) - table_score(board, BLACK_ROOK, &ROOK_PST);

    score += open_file_score(board, WHITE_ROOK) - open_file_score(board, BLACK_ROOK);
    score += open_file_score(board, WHITE_QUEEN) - open_file_score(board, BLACK_QUEEN);

    score += king_score(board, WHITE) - king_score(board, BLACK);

    if board.piece_count[WHITE_BISHOP as usize] == 2 {
        score += BISHOP_PAIR_BONUS;
    }
    if board.piece_count[BLACK_BISHOP as usize] == 2 {
        score -= BISHOP_PAIR_BONUS;
    }

    score
}

/// Dense index into a white-view table for a piece of `colour` on `sq`
#[inline]
fn table_index(sq: usize, colour: usize) -> usize {
    if colour == WHITE {
        sq64(sq)
    } else {
        MIRROR64[sq64(sq)]
    }
}

fn table_score(board: &Board, piece: u8, table: &[i32; 64]) -> i32 {
    let colour = piece_colour(piece);
    board
        .piece_squares(piece)
        .iter()
        .map(|&sq| table[table_index(sq, colour)])
        .sum()
}

/// Table, isolation and passed-pawn terms for one side, positive for that side
fn pawn_score(board: &Board, colour: usize) -> i32 {
    let (pawn, passed_masks) = if colour == WHITE {
        (WHITE_PAWN, &WHITE_PASSED_MASK)
    } else {
        (BLACK_PAWN, &BLACK_PASSED_MASK)
    };
    let own = board.pawns[colour];
    let enemy = board.pawns[colour ^ 1];

    let mut score = 0;
    for &sq in board.piece_squares(pawn) {
        let dense = sq64(sq);
        score += PAWN_PST[table_index(sq, colour)];

        if ISOLATED_MASK[dense] & own == 0 {
            score += ISOLATED_PAWN_PENALTY;
        }

        if passed_masks[dense] & enemy == 0 {
            let rank = rank_of(sq);
            score += PASSED_PAWN_BONUS[if colour == WHITE { rank } else { 7 - rank }];
        }
    }

    score
}

/// Open and semi-open file bonus for rooks or queens, positive for their side
fn open_file_score(board: &Board, piece: u8) -> i32 {
    let colour = piece_colour(piece);
    let (open, semi_open) = if PIECE_BISHOP_QUEEN[piece as usize] {
        (QUEEN_OPEN_FILE_BONUS, QUEEN_SEMI_OPEN_FILE_BONUS)
    } else {
        (ROOK_OPEN_FILE_BONUS, ROOK_SEMI_OPEN_FILE_BONUS)
    };

    let mut score = 0;
    for &sq in board.piece_squares(piece) {
        let file = file_bb(file_of(sq));
        if file & board.pawns[BOTH] == 0 {
            score += open;
        } else if file & board.pawns[colour] == 0 {
            score += semi_open;
        }
    }
    score
}

/// King table by phase plus pawn shield, positive for that side
fn king_score(board: &Board, colour: usize) -> i32 {
    let king = board.king_sq[colour];
    let table = if board.material[colour ^ 1] <= END_GAME_LIMIT {
        &KING_ENDGAME_PST
    } else {
        &KING_OPENING_PST
    };

    let mut score = table[table_index(king, colour)];

    if let Some(shield) = king_shield_mask(king) {
        if (shield & board.pawns[colour]).count_ones() >= KING_SHIELD_MIN_PAWNS {
            score += KING_SHIELD_BONUS;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::KIWIPETE;
    use crate::board::STARTING_FEN;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).expect("FEN should parse")
    }

    #[test]
    fn start_position_is_level() {
        let b = Board::new();
        assert_eq!(score_from_white(&b), 0);
        assert_eq!(evaluate(&b), 0);
    }

    #[test]
    fn mirrored_positions_negate() {
        for fen in [
            STARTING_FEN,
            KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            "6k1/5ppp/8/8/8/8/5PPP/2R3K1 b - - 0 1",
        ] {
            let b = board(fen);
            let mirrored = b.mirror();
            assert_eq!(score_from_white(&mirrored), -score_from_white(&b), "{}", fen);
            // side to move flips too, so the mover's view is unchanged
            assert_eq!(evaluate(&mirrored), evaluate(&b), "{}", fen);
        }
    }

    #[test]
    fn side_to_move_flips_sign() {
        let white = board("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let black = board("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1");
        assert!(evaluate(&white) > 0);
        assert_eq!(evaluate(&black), -evaluate(&white));
    }

    #[test]
    fn insufficient_material() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "4k3/8/8/8/8/8/8/3NKN2 w - - 0 1",
            "4kb2/8/8/8/8/8/8/4KB2 w - - 0 1",
            "4kn2/8/8/8/8/8/8/4KB2 w - - 0 1",
            "4kr2/8/8/8/8/8/8/R3KB2 w - - 0 1",
            "3nk3/8/8/8/8/8/8/R3K3 w - - 0 1",
            "2nbk3/8/8/8/8/8/8/R3K3 b - - 0 1",
        ] {
            assert!(is_material_draw(&board(fen)), "{}", fen);
            assert_eq!(evaluate(&board(fen)), 0, "{}", fen);
        }

        for fen in [
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/R3K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1",
            "4k3/8/8/8/8/8/8/2NBK3 w - - 0 1",
        ] {
            assert!(!is_material_draw(&board(fen)), "{}", fen);
        }
    }

    #[test]
    fn isolated_and_passed_pawns() {
        // lone white pawn on e4 is isolated and passed
        let b = board("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(pawn_score(&b, WHITE), PAWN_PST[sq64(parse_square("e4").unwrap())] + ISOLATED_PAWN_PENALTY + PASSED_PAWN_BONUS[3]);

        // a black pawn on d6 blocks the passer but the e4 pawn gains a neighbour
        let b = board("4k3/8/3p4/8/3PP3/8/8/4K3 w - - 0 1");
        let e4 = sq64(parse_square("e4").unwrap());
        assert_ne!(WHITE_PASSED_MASK[e4] & b.pawns[BLACK], 0);
        assert_ne!(ISOLATED_MASK[e4] & b.pawns[WHITE], 0);

        // black passed bonus counts ranks from black's side
        let b = board("4k3/8/8/8/8/3p4/8/4K3 b - - 0 1");
        let d3 = parse_square("d3").unwrap();
        assert_eq!(pawn_score(&b, BLACK), PAWN_PST[table_index(d3, BLACK)] + ISOLATED_PAWN_PENALTY + PASSED_PAWN_BONUS[5]);
    }

    #[test]
    fn masks_cover_expected_squares() {
        let a2 = 8;
        assert_eq!(ISOLATED_MASK[a2], file_bb(1));
        assert_eq!((WHITE_PASSED_MASK[a2]).count_ones(), 12);
        let h7 = 55;
        assert_eq!((BLACK_PASSED_MASK[h7]).count_ones(), 12);
        assert_eq!(WHITE_PASSED_MASK[h7 + 8], 0);
    }

    #[test]
    fn rook_files_and_bishop_pair() {
        let open = board("4k3/8/8/8/8/8/1P6/R3K3 w - - 0 1");
        assert_eq!(open_file_score(&open, WHITE_ROOK), ROOK_OPEN_FILE_BONUS);
        let semi = board("4k3/p7/8/8/8/8/1P6/R3K3 w - - 0 1");
        assert_eq!(open_file_score(&semi, WHITE_ROOK), ROOK_SEMI_OPEN_FILE_BONUS);
        let closed = board("4k3/8/8/8/8/8/P7/R3K3 w - - 0 1");
        assert_eq!(open_file_score(&closed, WHITE_ROOK), 0);
        let queen = board("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1");
        assert_eq!(open_file_score(&queen, WHITE_QUEEN), QUEEN_OPEN_FILE_BONUS);

        let pair = board("4k3/8/8/8/8/8/4P3/2B1KB2 w - - 0 1");
        let single = board("4k3/8/8/8/8/8/4P3/2B1K3 w - - 0 1");
        let difference = score_from_white(&pair) - score_from_white(&single);
        let f1_bishop = BISHOP_PST[sq64(F1)];
        assert_eq!(difference, PIECE_VALUES[WHITE_BISHOP as usize] + f1_bishop + BISHOP_PAIR_BONUS);
    }

    #[test]
    fn king_phase_and_shield() {
        // full material: opening table and a three-pawn shield on g1
        let castled = board("rnbq1rk1/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1RK1 w - - 0 1");
        assert_eq!(king_score(&castled, WHITE), KING_OPENING_PST[sq64(G1)] + KING_SHIELD_BONUS);
        assert_eq!(king_score(&castled, BLACK), KING_OPENING_PST[sq64(G1)] + KING_SHIELD_BONUS);

        let thin = board("rnbq1rk1/pppppppp/8/8/8/8/PPPPP2P/RNBQ1RK1 w - - 0 1");
        assert_eq!(king_score(&thin, WHITE), KING_OPENING_PST[sq64(G1)]);

        // a bare opponent puts the king on the endgame table
        let ending = board("4k3/8/8/8/8/8/8/R2QK3 w - - 0 1");
        assert_eq!(king_score(&ending, WHITE), KING_ENDGAME_PST[sq64(E1)]);
        assert_eq!(king_score(&ending, BLACK), KING_OPENING_PST[MIRROR64[sq64(E8)]]);
    }
}
