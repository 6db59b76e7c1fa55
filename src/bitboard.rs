//! Bitboard utilities
//!
//! A bitboard is a 64-bit integer where bit `n` is the dense square `n`
//! (0 = a1, 63 = h8). The board keeps pawn occupancy this way; the
//! evaluator keeps its file, passed-pawn and king-shield masks this way.

// ============================================================================
// CONSTANTS - Files
// ============================================================================

pub const FILE_A_BB: u64 = 0x0101010101010101;
pub const FILE_H_BB: u64 = 0x8080808080808080;

// ============================================================================
// BIT OPERATIONS
// ============================================================================

/// Create a bitboard with a single bit set at the given square
#[inline]
pub const fn square_bb(sq64: usize) -> u64 {
    1u64 << sq64
}

#[inline]
pub fn set_bit(bb: &mut u64, sq64: usize) {
    debug_assert!(sq64 < 64);
    *bb |= square_bb(sq64);
}

#[inline]
pub fn clear_bit(bb: &mut u64, sq64: usize) {
    debug_assert!(sq64 < 64);
    *bb &= !square_bb(sq64);
}

/// Count the number of set bits in a bitboard
#[inline]
pub fn count_bits(bb: u64) -> u32 {
    bb.count_ones()
}

/// Extract and clear the least significant bit, returning its index
#[inline]
pub fn pop_bit(bb: &mut u64) -> usize {
    debug_assert!(*bb != 0, "pop_bit on an empty bitboard");
    let idx = bb.trailing_zeros() as usize;
    *bb &= *bb - 1;
    idx
}

/// Get the bitboard for a file (0-7)
#[inline]
pub const fn file_bb(file: usize) -> u64 {
    FILE_A_BB << file
}

/// Iterate over the set squares of a bitboard, lowest first
pub fn squares(mut bb: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || if bb == 0 { None } else { Some(pop_bit(&mut bb)) })
}
