//! Square mapping between the dense 8x8 index (0 = a1, 63 = h8) and the
//! padded 10x12 mailbox index (21 = a1, 98 = h8).
//!
//! The two border rows above and below and the border columns left and
//! right mean that any knight or king offset from a playing square lands
//! inside the array, so generators only compare against `OFFBOARD`.

use crate::types::OFFBOARD;

pub const BOARD_SQUARES: usize = 120;

/// "No square" marker for the 120 index space
pub const NO_SQ: usize = 99;

/// Marker in `SQ120_TO_SQ64` for padding squares
pub const INVALID_SQ64: usize = 65;

/// Marker in `FILES_BRD` / `RANKS_BRD` for padding squares
pub const OFFBOARD_LINE: usize = OFFBOARD as usize;

pub const FILE_A: usize = 0;
pub const FILE_H: usize = 7;
pub const RANK_1: usize = 0;
pub const RANK_2: usize = 1;
pub const RANK_7: usize = 6;
pub const RANK_8: usize = 7;

pub const A1: usize = fr_to_sq(0, 0);
pub const B1: usize = fr_to_sq(1, 0);
pub const C1: usize = fr_to_sq(2, 0);
pub const D1: usize = fr_to_sq(3, 0);
pub const E1: usize = fr_to_sq(4, 0);
pub const F1: usize = fr_to_sq(5, 0);
pub const G1: usize = fr_to_sq(6, 0);
pub const H1: usize = fr_to_sq(7, 0);
pub const A8: usize = fr_to_sq(0, 7);
pub const B8: usize = fr_to_sq(1, 7);
pub const C8: usize = fr_to_sq(2, 7);
pub const D8: usize = fr_to_sq(3, 7);
pub const E8: usize = fr_to_sq(4, 7);
pub const F8: usize = fr_to_sq(5, 7);
pub const G8: usize = fr_to_sq(6, 7);
pub const H8: usize = fr_to_sq(7, 7);

/// File and rank names for coordinate notation
pub const FILE_NAMES: &[u8; 8] = b"abcdefgh";
pub const RANK_NAMES: &[u8; 8] = b"12345678";

// ============================================================================
// LOOKUP TABLES
// ============================================================================

pub static SQ120_TO_SQ64: [usize; BOARD_SQUARES] = init_sq120_to_sq64();
pub static SQ64_TO_SQ120: [usize; 64] = init_sq64_to_sq120();
pub static FILES_BRD: [usize; BOARD_SQUARES] = init_files_brd();
pub static RANKS_BRD: [usize; BOARD_SQUARES] = init_ranks_brd();

/// Vertical flip of a dense square: a1 <-> a8, e2 <-> e7
pub static MIRROR64: [usize; 64] = init_mirror64();

/// File/rank (both 0-7) to padded square
#[inline]
pub const fn fr_to_sq(file: usize, rank: usize) -> usize {
    21 + file + rank * 10
}

const fn init_sq120_to_sq64() -> [usize; BOARD_SQUARES] {
    let mut table = [INVALID_SQ64; BOARD_SQUARES];
    let mut sq64 = 0usize;

    while sq64 < 64 {
        table[fr_to_sq(sq64 % 8, sq64 / 8)] = sq64;
        sq64 += 1;
    }

    table
}

const fn init_sq64_to_sq120() -> [usize; 64] {
    let mut table = [0usize; 64];
    let mut sq64 = 0usize;

    while sq64 < 64 {
        table[sq64] = fr_to_sq(sq64 % 8, sq64 / 8);
        sq64 += 1;
    }

    table
}

const fn init_files_brd() -> [usize; BOARD_SQUARES] {
    let mut table = [OFFBOARD_LINE; BOARD_SQUARES];
    let mut sq64 = 0usize;

    while sq64 < 64 {
        table[fr_to_sq(sq64 % 8, sq64 / 8)] = sq64 % 8;
        sq64 += 1;
    }

    table
}

const fn init_ranks_brd() -> [usize; BOARD_SQUARES] {
    let mut table = [OFFBOARD_LINE; BOARD_SQUARES];
    let mut sq64 = 0usize;

    while sq64 < 64 {
        table[fr_to_sq(sq64 % 8, sq64 / 8)] = sq64 / 8;
        sq64 += 1;
    }

    table
}

const fn init_mirror64() -> [usize; 64] {
    let mut table = [0usize; 64];
    let mut sq64 = 0usize;

    while sq64 < 64 {
        table[sq64] = (7 - sq64 / 8) * 8 + sq64 % 8;
        sq64 += 1;
    }

    table
}

// ============================================================================
// HELPERS
// ============================================================================

#[inline]
pub fn sq64(sq120: usize) -> usize {
    debug_assert!(is_on_board(sq120), "square {} is not a playing square", sq120);
    SQ120_TO_SQ64[sq120]
}

#[inline]
pub fn sq120(sq64: usize) -> usize {
    SQ64_TO_SQ120[sq64]
}

#[inline]
pub fn file_of(sq120: usize) -> usize {
    FILES_BRD[sq120]
}

#[inline]
pub fn rank_of(sq120: usize) -> usize {
    RANKS_BRD[sq120]
}

/// True for the 64 playing squares of the padded board
#[inline]
pub fn is_on_board(sq120: usize) -> bool {
    sq120 < BOARD_SQUARES && FILES_BRD[sq120] != OFFBOARD_LINE
}

/// Vertical flip of a padded square
#[inline]
pub fn mirror_sq120(sq120: usize) -> usize {
    SQ64_TO_SQ120[MIRROR64[sq64(sq120)]]
}

/// Convert padded square to algebraic notation (e.g., "e4")
pub fn square_name(sq120: usize) -> String {
    if !is_on_board(sq120) {
        return "-".to_string();
    }
    format!(
        "{}{}",
        FILE_NAMES[file_of(sq120)] as char,
        RANK_NAMES[rank_of(sq120)] as char
    )
}

/// Convert algebraic notation to a padded square
pub fn parse_square(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }

    let file = match bytes[0] {
        b'a'..=b'h' => (bytes[0] - b'a') as usize,
        _ => return None,
    };

    let rank = match bytes[1] {
        b'1'..=b'8' => (bytes[1] - b'1') as usize,
        _ => return None,
    };

    Some(fr_to_sq(file, rank))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_and_padded_indices_agree() {
        for s64 in 0..64 {
            let s120 = sq120(s64);
            assert!(is_on_board(s120));
            assert_eq!(sq64(s120), s64);
            assert_eq!(file_of(s120), s64 % 8);
            assert_eq!(rank_of(s120), s64 / 8);
        }
    }

    #[test]
    fn padding_is_off_board() {
        let playing = (0..BOARD_SQUARES).filter(|&sq| is_on_board(sq)).count();
        assert_eq!(playing, 64);
        for sq in [0, 20, 29, 30, 99, 119] {
            assert!(!is_on_board(sq));
            assert_eq!(SQ120_TO_SQ64[sq], INVALID_SQ64);
        }
    }

    #[test]
    fn named_squares() {
        assert_eq!(A1, 21);
        assert_eq!(H1, 28);
        assert_eq!(A8, 91);
        assert_eq!(H8, 98);
        assert_eq!(square_name(E1), "e1");
        assert_eq!(parse_square("g8"), Some(G8));
        assert_eq!(parse_square("i1"), None);
        assert_eq!(parse_square("a9"), None);
        assert_eq!(parse_square("a"), None);
    }

    #[test]
    fn mirror_flips_ranks() {
        assert_eq!(mirror_sq120(A1), A8);
        assert_eq!(mirror_sq120(parse_square("e2").unwrap()), parse_square("e7").unwrap());
        for s64 in 0..64 {
            assert_eq!(MIRROR64[MIRROR64[s64]], s64);
        }
    }
}
