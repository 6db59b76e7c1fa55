//! Move encoding and move lists
//!
//! A `Move` is a packed `u32`:
//!
//! ```text
//! 0000 0000 0000 0000 0000 0111 1111  from (padded square)
//! 0000 0000 0000 0011 1111 1000 0000  to
//! 0000 0000 0011 1100 0000 0000 0000  captured piece
//! 0000 0000 0100 0000 0000 0000 0000  en passant
//! 0000 0000 1000 0000 0000 0000 0000  pawn double step
//! 0000 1111 0000 0000 0000 0000 0000  promoted piece
//! 0001 0000 0000 0000 0000 0000 0000  castle
//! ```

use crate::square::{is_on_board, square_name};
use crate::types::*;

pub const FLAG_EN_PASSANT: u32 = 0x40000;
pub const FLAG_PAWN_START: u32 = 0x80000;
pub const FLAG_CASTLE: u32 = 0x1000000;

const CAPTURE_MASK: u32 = 0x7C000;
const PROMOTION_MASK: u32 = 0xF00000;

/// A chess move, compared by value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// The "no move" value
    pub const NONE: Move = Move(0);

    pub fn new(from: usize, to: usize, captured: u8, promoted: u8, flags: u32) -> Self {
        debug_assert!(is_on_board(from) && is_on_board(to));
        debug_assert!(captured <= BLACK_KING && promoted <= BLACK_KING);
        Move(from as u32 | (to as u32) << 7 | (captured as u32) << 14 | (promoted as u32) << 20 | flags)
    }

    pub fn quiet(from: usize, to: usize) -> Self {
        Move::new(from, to, EMPTY, EMPTY, 0)
    }

    pub fn capture(from: usize, to: usize, captured: u8) -> Self {
        Move::new(from, to, captured, EMPTY, 0)
    }

    #[inline]
    pub fn from(self) -> usize {
        (self.0 & 0x7F) as usize
    }

    #[inline]
    pub fn to(self) -> usize {
        ((self.0 >> 7) & 0x7F) as usize
    }

    #[inline]
    pub fn captured(self) -> u8 {
        ((self.0 >> 14) & 0xF) as u8
    }

    #[inline]
    pub fn promoted(self) -> u8 {
        ((self.0 >> 20) & 0xF) as u8
    }

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.0 & FLAG_EN_PASSANT != 0
    }

    #[inline]
    pub fn is_pawn_start(self) -> bool {
        self.0 & FLAG_PAWN_START != 0
    }

    #[inline]
    pub fn is_castle(self) -> bool {
        self.0 & FLAG_CASTLE != 0
    }

    /// Captures a piece, including en passant
    #[inline]
    pub fn is_capture(self) -> bool {
        self.0 & CAPTURE_MASK != 0
    }

    #[inline]
    pub fn is_promotion(self) -> bool {
        self.0 & PROMOTION_MASK != 0
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == Move::NONE
    }

    /// Raw packed value
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Convert move to coordinate notation (e.g., "e2e4", "e7e8q")
    pub fn to_uci(&self) -> String {
        if self.is_none() {
            return "0000".to_string();
        }
        let mut uci = format!("{}{}", square_name(self.from()), square_name(self.to()));
        let promo_char = match self.promoted() {
            WHITE_QUEEN | BLACK_QUEEN => Some('q'),
            WHITE_ROOK | BLACK_ROOK => Some('r'),
            WHITE_BISHOP | BLACK_BISHOP => Some('b'),
            WHITE_KNIGHT | BLACK_KNIGHT => Some('n'),
            _ => None,
        };
        if let Some(c) = promo_char {
            uci.push(c);
        }
        uci
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// A generated move with its ordering score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-capacity move buffer; filling it never allocates
pub struct MoveList {
    moves: [ScoredMove; MAX_POSITION_MOVES],
    count: usize,
}

impl MoveList {
    pub fn new() -> Self {
        MoveList {
            moves: [ScoredMove::default(); MAX_POSITION_MOVES],
            count: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        debug_assert!(self.count < MAX_POSITION_MOVES, "move list overflow");
        self.moves[self.count] = ScoredMove { mv, score };
        self.count += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    #[inline]
    pub fn get(&self, index: usize) -> ScoredMove {
        self.moves[..self.count][index]
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.iter().any(|m| m.mv == mv)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredMove> {
        self.moves[..self.count].iter()
    }

    /// Give `mv` a new ordering score, if present. Returns whether it was found.
    pub fn set_score(&mut self, mv: Move, score: i32) -> bool {
        match self.moves[..self.count].iter_mut().find(|m| m.mv == mv) {
            Some(entry) => {
                entry.score = score;
                true
            }
            None => false,
        }
    }

    /// Swap the highest-scored move among `index..` into `index` and return it.
    /// Ties keep generation order.
    pub fn pick_next(&mut self, index: usize) -> Move {
        let mut best_score = i32::MIN;
        let mut best_index = index;

        for i in index..self.count {
            if self.moves[i].score > best_score {
                best_score = self.moves[i].score;
                best_index = i;
            }
        }

        self.moves.swap(index, best_index);
        self.moves[index].mv
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}
