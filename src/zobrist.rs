//! Zobrist position keys
//!
//! One random key per (piece, padded square), one per castling-rights
//! value and one for the side to move. The en passant square is hashed
//! with the `EMPTY` row of the piece keys. Keys come from a fixed seed,
//! so position keys are identical across runs.

use crate::square::BOARD_SQUARES;
use crate::types::{EMPTY, PIECE_TYPES};
use rand::prelude::*;
use std::sync::OnceLock;

const ZOBRIST_SEED: u64 = 12345;

pub struct ZobristKeys {
    pub piece_keys: [[u64; BOARD_SQUARES]; PIECE_TYPES],
    pub side_key: u64,
    pub castle_keys: [u64; 16],
}

impl ZobristKeys {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

        let mut piece_keys = [[0u64; BOARD_SQUARES]; PIECE_TYPES];
        for row in piece_keys.iter_mut() {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }

        let side_key = rng.gen();

        let mut castle_keys = [0u64; 16];
        for key in castle_keys.iter_mut() {
            *key = rng.gen();
        }

        ZobristKeys { piece_keys, side_key, castle_keys }
    }

    #[inline]
    pub fn piece(&self, piece: u8, sq: usize) -> u64 {
        self.piece_keys[piece as usize][sq]
    }

    #[inline]
    pub fn en_passant(&self, sq: usize) -> u64 {
        self.piece_keys[EMPTY as usize][sq]
    }

    #[inline]
    pub fn castle(&self, perm: u8) -> u64 {
        self.castle_keys[perm as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        ZobristKeys::new()
    }
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

/// Process-wide key set, built on first use
pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(ZobristKeys::new)
}
