//! Move ordering: MVV-LVA capture table and the killer/history tables
//!
//! Score bands, highest first:
//! best-move-table hit > captures > killer 0 > killer 1 > history.

use crate::moves::Move;
use crate::square::BOARD_SQUARES;
use crate::types::*;

pub const PV_MOVE_SCORE: i32 = 2_000_000;
pub const CAPTURE_BASE: i32 = 1_000_000;
pub const FIRST_KILLER_SCORE: i32 = 900_000;
pub const SECOND_KILLER_SCORE: i32 = 800_000;

/// Most valuable victim / least valuable attacker, indexed [victim][attacker]
pub static MVV_LVA: [[i32; PIECE_TYPES]; PIECE_TYPES] = init_mvv_lva();

const VICTIM_SCORE: [i32; PIECE_TYPES] = [
    0, 100, 200, 300, 400, 500, 600, 100, 200, 300, 400, 500, 600,
];

const fn init_mvv_lva() -> [[i32; PIECE_TYPES]; PIECE_TYPES] {
    let mut table = [[0i32; PIECE_TYPES]; PIECE_TYPES];
    let mut attacker = WHITE_PAWN as usize;

    while attacker <= BLACK_KING as usize {
        let mut victim = WHITE_PAWN as usize;
        while victim <= BLACK_KING as usize {
            table[victim][attacker] = VICTIM_SCORE[victim] + 6 - VICTIM_SCORE[attacker] / 100;
            victim += 1;
        }
        attacker += 1;
    }

    table
}

/// Ordering score of a capture
#[inline]
pub fn capture_score(victim: u8, attacker: u8) -> i32 {
    MVV_LVA[victim as usize][attacker as usize] + CAPTURE_BASE
}

/// En passant always takes a pawn with a pawn
pub const EN_PASSANT_SCORE: i32 = 105 + CAPTURE_BASE;

/// History scores stay below the killer band
pub const HISTORY_MAX: i32 = SECOND_KILLER_SCORE - 1;

/// Per-search killer and history tables
///
/// Reset at the start of each top-level search and only grown during it.
pub struct SearchHeuristics {
    killers: [[Move; 2]; MAX_DEPTH],
    history: [[i32; BOARD_SQUARES]; PIECE_TYPES],
}

impl SearchHeuristics {
    pub fn new() -> Self {
        SearchHeuristics {
            killers: [[Move::NONE; 2]; MAX_DEPTH],
            history: [[0; BOARD_SQUARES]; PIECE_TYPES],
        }
    }

    pub fn clear(&mut self) {
        self.killers = [[Move::NONE; 2]; MAX_DEPTH];
        self.history = [[0; BOARD_SQUARES]; PIECE_TYPES];
    }

    /// Record a quiet move that caused a beta cutoff at `ply`
    pub fn store_killer(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_DEPTH {
            return;
        }
        let slots = &mut self.killers[ply];
        slots[1] = slots[0];
        slots[0] = mv;
    }

    /// Credit a quiet move that raised alpha
    pub fn add_history(&mut self, piece: u8, to: usize, depth: usize) {
        let entry = &mut self.history[piece as usize][to];
        *entry = entry.saturating_add(depth as i32).min(HISTORY_MAX);
    }

    pub fn killers(&self, ply: usize) -> [Move; 2] {
        if ply < MAX_DEPTH {
            self.killers[ply]
        } else {
            [Move::NONE; 2]
        }
    }

    pub fn history(&self, piece: u8, to: usize) -> i32 {
        self.history[piece as usize][to]
    }

    /// Ordering score of a quiet move made by `piece`
    pub fn quiet_score(&self, ply: usize, mv: Move, piece: u8) -> i32 {
        let [first, second] = self.killers(ply);
        if mv == first {
            FIRST_KILLER_SCORE
        } else if mv == second {
            SECOND_KILLER_SCORE
        } else {
            self.history(piece, mv.to())
        }
    }
}

impl Default for SearchHeuristics {
    fn default() -> Self {
        SearchHeuristics::new()
    }
}
