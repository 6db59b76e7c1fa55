//! Making and taking back moves
//!
//! Every change to the squares goes through `add_piece`, `clear_piece` or
//! `move_piece`, which keep the piece lists, pawn bitboards, counters and
//! Zobrist key in step with the square array.

use crate::attack::is_square_attacked;
use crate::bitboard::{clear_bit, set_bit};
use crate::board::{Board, UndoRecord, CASTLE_PERM_MASK};
use crate::error::{ChessError, ChessResult};
use crate::move_generator::MoveGenerator;
use crate::moves::Move;
use crate::square::*;
use crate::types::*;
use crate::zobrist::keys;

impl Board {
    // ========================================================================
    // PIECE PRIMITIVES
    // ========================================================================

    /// Remove the piece on `sq`. Returns the piece-list slot it held; the
    /// last entry of the list moves into that slot.
    pub(crate) fn clear_piece(&mut self, sq: usize) -> usize {
        let piece = self.squares[sq];
        debug_assert!(is_piece(piece), "clear_piece on empty square {}", square_name(sq));
        let p = piece as usize;
        let colour = piece_colour(piece);

        self.pos_key ^= keys().piece(piece, sq);
        self.squares[sq] = EMPTY;
        self.material[colour] -= PIECE_VALUES[p];

        if PIECE_BIG[p] {
            self.big_pieces[colour] -= 1;
            if PIECE_MAJOR[p] {
                self.major_pieces[colour] -= 1;
            } else {
                self.minor_pieces[colour] -= 1;
            }
        } else {
            clear_bit(&mut self.pawns[colour], sq64(sq));
            clear_bit(&mut self.pawns[BOTH], sq64(sq));
        }

        let count = self.piece_count[p];
        match self.piece_list[p][..count].iter().position(|&s| s == sq) {
            Some(slot) => {
                self.piece_list[p][slot] = self.piece_list[p][count - 1];
                self.piece_count[p] -= 1;
                slot
            }
            None => {
                debug_assert!(false, "piece list of {} is missing {}", piece, square_name(sq));
                count
            }
        }
    }

    /// Put `piece` on the empty square `sq`, at the end of its piece list
    pub(crate) fn add_piece(&mut self, sq: usize, piece: u8) {
        let slot = self.piece_count[piece as usize];
        self.restore_piece(sq, piece, slot);
    }

    /// Put `piece` on the empty square `sq` at list position `slot`, undoing
    /// the `clear_piece` that returned `slot`
    pub(crate) fn restore_piece(&mut self, sq: usize, piece: u8, slot: usize) {
        debug_assert!(is_piece(piece));
        debug_assert_eq!(self.squares[sq], EMPTY, "add_piece on occupied {}", square_name(sq));
        let p = piece as usize;
        let colour = piece_colour(piece);

        self.pos_key ^= keys().piece(piece, sq);
        self.squares[sq] = piece;
        self.material[colour] += PIECE_VALUES[p];

        if PIECE_BIG[p] {
            self.big_pieces[colour] += 1;
            if PIECE_MAJOR[p] {
                self.major_pieces[colour] += 1;
            } else {
                self.minor_pieces[colour] += 1;
            }
        } else {
            set_bit(&mut self.pawns[colour], sq64(sq));
            set_bit(&mut self.pawns[BOTH], sq64(sq));
        }

        if PIECE_KING[p] {
            self.king_sq[colour] = sq;
        }

        let count = self.piece_count[p];
        debug_assert!(count < MAX_PIECES_PER_TYPE);
        debug_assert!(slot <= count);
        self.piece_list[p][count] = self.piece_list[p][slot];
        self.piece_list[p][slot] = sq;
        self.piece_count[p] += 1;
    }

    /// Move the piece on `from` to the empty square `to`
    pub(crate) fn move_piece(&mut self, from: usize, to: usize) {
        let piece = self.squares[from];
        debug_assert!(is_piece(piece), "move_piece from empty square {}", square_name(from));
        debug_assert_eq!(self.squares[to], EMPTY);
        let p = piece as usize;
        let colour = piece_colour(piece);
        let k = keys();

        self.pos_key ^= k.piece(piece, from);
        self.squares[from] = EMPTY;
        self.pos_key ^= k.piece(piece, to);
        self.squares[to] = piece;

        if PIECE_PAWN[p] {
            clear_bit(&mut self.pawns[colour], sq64(from));
            clear_bit(&mut self.pawns[BOTH], sq64(from));
            set_bit(&mut self.pawns[colour], sq64(to));
            set_bit(&mut self.pawns[BOTH], sq64(to));
        }

        if PIECE_KING[p] {
            self.king_sq[colour] = to;
        }

        let count = self.piece_count[p];
        if let Some(slot) = self.piece_list[p][..count].iter_mut().find(|s| **s == from) {
            *slot = to;
        } else {
            debug_assert!(false, "piece list of {} is missing {}", piece, square_name(from));
        }
    }

    // ========================================================================
    // MAKE / UNMAKE
    // ========================================================================

    /// Play a pseudo-legal move. Returns false, with the board restored, if
    /// it leaves the mover's king attacked.
    pub fn make_move(&mut self, mv: Move) -> bool {
        let from = mv.from();
        let to = mv.to();
        let side = self.side;
        let k = keys();

        debug_assert!(is_on_board(from) && is_on_board(to));
        debug_assert!(piece_colour(self.squares[from]) == side, "{} moves the wrong colour", mv);

        let mut undo = UndoRecord {
            mv,
            castle_perm: self.castle_perm,
            en_passant: self.en_passant,
            fifty_move: self.fifty_move,
            pos_key: self.pos_key,
            ..UndoRecord::default()
        };

        if mv.is_en_passant() {
            let slot = if side == WHITE { self.clear_piece(to - 10) } else { self.clear_piece(to + 10) };
            undo.captured_slot = slot as u8;
        } else if mv.is_castle() {
            match to {
                C1 => self.move_piece(A1, D1),
                G1 => self.move_piece(H1, F1),
                C8 => self.move_piece(A8, D8),
                G8 => self.move_piece(H8, F8),
                _ => debug_assert!(false, "castle move to {}", square_name(to)),
            }
        }

        if let Some(ep) = self.en_passant {
            self.pos_key ^= k.en_passant(ep);
        }
        self.pos_key ^= k.castle(self.castle_perm);

        self.castle_perm &= CASTLE_PERM_MASK[from] & CASTLE_PERM_MASK[to];
        self.en_passant = None;
        self.pos_key ^= k.castle(self.castle_perm);

        self.fifty_move += 1;

        let captured = mv.captured();
        if captured != EMPTY && !mv.is_en_passant() {
            undo.captured_slot = self.clear_piece(to) as u8;
        }
        if captured != EMPTY {
            self.fifty_move = 0;
        }

        self.ply += 1;

        if PIECE_PAWN[self.squares[from] as usize] {
            self.fifty_move = 0;
            if mv.is_pawn_start() {
                let ep = if side == WHITE { from + 10 } else { from - 10 };
                self.en_passant = Some(ep);
                self.pos_key ^= k.en_passant(ep);
            }
        }

        self.move_piece(from, to);

        let promoted = mv.promoted();
        if promoted != EMPTY {
            undo.pawn_slot = self.clear_piece(to) as u8;
            self.add_piece(to, promoted);
        }

        self.history.push(undo);
        self.side ^= 1;
        self.pos_key ^= k.side_key;
        if side == BLACK {
            self.fullmove_number += 1;
        }

        if is_square_attacked(self, self.king_sq[side], self.side) {
            self.unmake_move();
            return false;
        }

        true
    }

    /// Take back the last move made with `make_move`
    pub fn unmake_move(&mut self) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unmake_move with empty history");
            return;
        };
        let k = keys();
        let mv = undo.mv;
        let from = mv.from();
        let to = mv.to();

        self.ply = self.ply.saturating_sub(1);

        if let Some(ep) = self.en_passant {
            self.pos_key ^= k.en_passant(ep);
        }
        self.pos_key ^= k.castle(self.castle_perm);

        self.castle_perm = undo.castle_perm;
        self.fifty_move = undo.fifty_move;
        self.en_passant = undo.en_passant;

        if let Some(ep) = self.en_passant {
            self.pos_key ^= k.en_passant(ep);
        }
        self.pos_key ^= k.castle(self.castle_perm);

        self.side ^= 1;
        self.pos_key ^= k.side_key;
        if self.side == BLACK {
            self.fullmove_number -= 1;
        }

        if mv.is_en_passant() {
            let slot = undo.captured_slot as usize;
            if self.side == WHITE {
                self.restore_piece(to - 10, BLACK_PAWN, slot);
            } else {
                self.restore_piece(to + 10, WHITE_PAWN, slot);
            }
        } else if mv.is_castle() {
            match to {
                C1 => self.move_piece(D1, A1),
                G1 => self.move_piece(F1, H1),
                C8 => self.move_piece(D8, A8),
                G8 => self.move_piece(F8, H8),
                _ => debug_assert!(false, "castle move to {}", square_name(to)),
            }
        }

        self.move_piece(to, from);

        let captured = mv.captured();
        if captured != EMPTY && !mv.is_en_passant() {
            self.restore_piece(to, captured, undo.captured_slot as usize);
        }

        if mv.promoted() != EMPTY {
            self.clear_piece(from);
            let pawn = if self.side == WHITE { WHITE_PAWN } else { BLACK_PAWN };
            self.restore_piece(from, pawn, undo.pawn_slot as usize);
        }

        debug_assert_eq!(self.pos_key, undo.pos_key, "key drift taking back {}", mv);
        self.pos_key = undo.pos_key;
    }

    /// Pass the turn. Only valid when the side to move is not in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check(), "null move while in check");
        let k = keys();

        self.ply += 1;
        self.history.push(UndoRecord {
            mv: Move::NONE,
            castle_perm: self.castle_perm,
            en_passant: self.en_passant,
            fifty_move: self.fifty_move,
            pos_key: self.pos_key,
            ..UndoRecord::default()
        });

        if let Some(ep) = self.en_passant.take() {
            self.pos_key ^= k.en_passant(ep);
        }

        self.side ^= 1;
        self.pos_key ^= k.side_key;
    }

    pub fn unmake_null_move(&mut self) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unmake_null_move with empty history");
            return;
        };
        debug_assert!(undo.mv.is_none(), "unmake_null_move over a real move");

        self.ply = self.ply.saturating_sub(1);
        self.castle_perm = undo.castle_perm;
        self.fifty_move = undo.fifty_move;
        self.en_passant = undo.en_passant;
        self.side ^= 1;
        self.pos_key = undo.pos_key;
    }

    /// Play a move given in coordinate notation as part of the game record.
    /// The search ply is reset; history is kept for repetition detection.
    pub fn make_uci_move(&mut self, text: &str) -> ChessResult<()> {
        let mv = MoveGenerator::new().parse_move(self, text)?;
        if !self.make_move(mv) {
            return Err(ChessError::InvalidMove(text.to_string()));
        }
        self.ply = 0;
        Ok(())
    }
}
