//! Move Generator Module
//!
//! Generates pseudo-legal moves: every rule is honoured except that the
//! mover's own king may be left attacked. `Board::make_move` rejects those.
//! Each move is scored for ordering as it is added.

use crate::attack::{is_square_attacked, offset, BISHOP_DIRECTIONS, KING_DIRECTIONS, KNIGHT_DIRECTIONS, ROOK_DIRECTIONS};
use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::moves::{Move, MoveList, FLAG_CASTLE, FLAG_EN_PASSANT, FLAG_PAWN_START};
use crate::ordering::{capture_score, SearchHeuristics, EN_PASSANT_SCORE};
use crate::square::*;
use crate::types::*;

/// Sliding pieces per side: bishop, rook, queen
const SLIDERS: [[u8; 3]; 2] = [
    [WHITE_BISHOP, WHITE_ROOK, WHITE_QUEEN],
    [BLACK_BISHOP, BLACK_ROOK, BLACK_QUEEN],
];

/// Non-sliding pieces per side: knight, king
const LEAPERS: [[u8; 2]; 2] = [[WHITE_KNIGHT, WHITE_KING], [BLACK_KNIGHT, BLACK_KING]];

const PROMOTIONS: [[u8; 4]; 2] = [
    [WHITE_QUEEN, WHITE_ROOK, WHITE_BISHOP, WHITE_KNIGHT],
    [BLACK_QUEEN, BLACK_ROOK, BLACK_BISHOP, BLACK_KNIGHT],
];

fn directions(piece: u8) -> &'static [isize] {
    match piece {
        WHITE_KNIGHT | BLACK_KNIGHT => &KNIGHT_DIRECTIONS,
        WHITE_BISHOP | BLACK_BISHOP => &BISHOP_DIRECTIONS,
        WHITE_ROOK | BLACK_ROOK => &ROOK_DIRECTIONS,
        WHITE_QUEEN | BLACK_QUEEN | WHITE_KING | BLACK_KING => &KING_DIRECTIONS,
        _ => &[],
    }
}

/// Move generator for mailbox positions
pub struct MoveGenerator;

impl MoveGenerator {
    /// Create a new move generator
    pub fn new() -> Self {
        MoveGenerator
    }

    /// Generate pseudo-legal moves for the side to move into `list`.
    ///
    /// With `only_captures` set, quiet moves and castling are skipped but
    /// promotions and en passant are kept.
    pub fn generate_moves(
        &self,
        board: &Board,
        only_captures: bool,
        heuristics: &SearchHeuristics,
        list: &mut MoveList,
    ) {
        list.clear();
        let mut out = Emitter { board, heuristics, list, only_captures };
        let side = board.side;

        self.generate_pawn_moves(&mut out, side);

        if !only_captures {
            self.generate_castling_moves(&mut out, side);
        }

        for &piece in SLIDERS[side].iter().chain(&LEAPERS[side]) {
            for &sq in board.piece_squares(piece) {
                if PIECE_SLIDES[piece as usize] {
                    self.generate_sliding_moves(&mut out, sq, directions(piece));
                } else {
                    self.generate_single_step_moves(&mut out, sq, directions(piece));
                }
            }
        }
    }

    /// All pseudo-legal moves with no killer/history information
    pub fn generate_all(&self, board: &Board) -> MoveList {
        let mut list = MoveList::new();
        self.generate_moves(board, false, &SearchHeuristics::new(), &mut list);
        list
    }

    fn generate_pawn_moves(&self, out: &mut Emitter, side: usize) {
        let board = out.board;
        let (pawn, forward, start_rank, enemy): (u8, isize, usize, usize) = if side == WHITE {
            (WHITE_PAWN, 10, RANK_2, BLACK)
        } else {
            (BLACK_PAWN, -10, RANK_7, WHITE)
        };

        for &sq in board.piece_squares(pawn) {
            let one_step = offset(sq, forward);

            // Pushes
            if board.squares[one_step] == EMPTY {
                out.pawn_move(side, sq, one_step, EMPTY);
                let two_step = offset(one_step, forward);
                if rank_of(sq) == start_rank && board.squares[two_step] == EMPTY {
                    out.quiet(Move::new(sq, two_step, EMPTY, EMPTY, FLAG_PAWN_START));
                }
            }

            // Captures, including en passant
            for diagonal in [forward - 1, forward + 1] {
                let target = offset(sq, diagonal);
                let victim = board.squares[target];
                if victim != OFFBOARD && victim != EMPTY && piece_colour(victim) == enemy {
                    out.pawn_move(side, sq, target, victim);
                }
                if board.en_passant == Some(target) {
                    out.en_passant(Move::new(sq, target, EMPTY, EMPTY, FLAG_EN_PASSANT));
                }
            }
        }
    }

    fn generate_castling_moves(&self, out: &mut Emitter, side: usize) {
        let board = out.board;
        let perm = board.castle_perm;
        let squares = &board.squares;
        let enemy = side ^ 1;

        if side == WHITE {
            if perm & CASTLE_WK != 0
                && squares[F1] == EMPTY
                && squares[G1] == EMPTY
                && !is_square_attacked(board, E1, enemy)
                && !is_square_attacked(board, F1, enemy)
            {
                out.quiet(Move::new(E1, G1, EMPTY, EMPTY, FLAG_CASTLE));
            }
            if perm & CASTLE_WQ != 0
                && squares[D1] == EMPTY
                && squares[C1] == EMPTY
                && squares[B1] == EMPTY
                && !is_square_attacked(board, E1, enemy)
                && !is_square_attacked(board, D1, enemy)
            {
                out.quiet(Move::new(E1, C1, EMPTY, EMPTY, FLAG_CASTLE));
            }
        } else {
            if perm & CASTLE_BK != 0
                && squares[F8] == EMPTY
                && squares[G8] == EMPTY
                && !is_square_attacked(board, E8, enemy)
                && !is_square_attacked(board, F8, enemy)
            {
                out.quiet(Move::new(E8, G8, EMPTY, EMPTY, FLAG_CASTLE));
            }
            if perm & CASTLE_BQ != 0
                && squares[D8] == EMPTY
                && squares[C8] == EMPTY
                && squares[B8] == EMPTY
                && !is_square_attacked(board, E8, enemy)
                && !is_square_attacked(board, D8, enemy)
            {
                out.quiet(Move::new(E8, C8, EMPTY, EMPTY, FLAG_CASTLE));
            }
        }
    }

    /// Bishops, rooks and queens: walk each ray until blocked
    fn generate_sliding_moves(&self, out: &mut Emitter, sq: usize, dirs: &[isize]) {
        let board = out.board;
        let side = board.side;

        for &dir in dirs {
            let mut target = offset(sq, dir);
            loop {
                let piece = board.squares[target];
                if piece == OFFBOARD {
                    break;
                }
                if piece != EMPTY {
                    if piece_colour(piece) != side {
                        out.capture(Move::capture(sq, target, piece));
                    }
                    break;
                }
                out.quiet(Move::quiet(sq, target));
                target = offset(target, dir);
            }
        }
    }

    /// Knights and kings: one step per direction
    fn generate_single_step_moves(&self, out: &mut Emitter, sq: usize, dirs: &[isize]) {
        let board = out.board;
        let side = board.side;

        for &dir in dirs {
            let target = offset(sq, dir);
            let piece = board.squares[target];
            if piece == OFFBOARD {
                continue;
            }
            if piece == EMPTY {
                out.quiet(Move::quiet(sq, target));
            } else if piece_colour(piece) != side {
                out.capture(Move::capture(sq, target, piece));
            }
        }
    }

    /// Resolve coordinate text ("e2e4", "e7e8q") against the pseudo-legal
    /// moves of the position. Self-check is left to `make_move`.
    pub fn parse_move(&self, board: &Board, text: &str) -> ChessResult<Move> {
        let text = text.trim();
        let invalid = || ChessError::InvalidMove(text.to_string());
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(invalid());
        }

        let from = parse_square(&text[0..2]).ok_or_else(invalid)?;
        let to = parse_square(&text[2..4]).ok_or_else(invalid)?;
        let promotion = match text.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(0),
            Some(b'r') => Some(1),
            Some(b'b') => Some(2),
            Some(b'n') => Some(3),
            Some(_) => return Err(invalid()),
        };

        let list = self.generate_all(board);
        let found = list
            .iter()
            .map(|m| m.mv)
            .find(|mv| {
                mv.from() == from
                    && mv.to() == to
                    && match promotion {
                        None => !mv.is_promotion(),
                        Some(kind) => mv.promoted() == PROMOTIONS[board.side][kind],
                    }
            })
            .ok_or_else(invalid);
        found
    }

    /// True if `mv` is a legal move in this position
    pub fn move_exists(&self, board: &mut Board, mv: Move) -> bool {
        let list = self.generate_all(board);
        for scored in list.iter() {
            if scored.mv != mv {
                continue;
            }
            if board.make_move(mv) {
                board.unmake_move();
                return true;
            }
            return false;
        }
        false
    }

    /// Legal moves only, in generation order
    pub fn legal_moves(&self, board: &mut Board) -> Vec<Move> {
        let list = self.generate_all(board);
        let mut legal = Vec::with_capacity(list.len());
        for scored in list.iter() {
            if board.make_move(scored.mv) {
                board.unmake_move();
                legal.push(scored.mv);
            }
        }
        legal
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        MoveGenerator::new()
    }
}

/// Scores moves as they are pushed and applies the captures-only filter
struct Emitter<'a> {
    board: &'a Board,
    heuristics: &'a SearchHeuristics,
    list: &'a mut MoveList,
    only_captures: bool,
}

impl Emitter<'_> {
    fn quiet(&mut self, mv: Move) {
        if self.only_captures && !mv.is_promotion() {
            return;
        }
        let piece = self.board.squares[mv.from()];
        let score = self.heuristics.quiet_score(self.board.ply, mv, piece);
        self.list.push(mv, score);
    }

    fn capture(&mut self, mv: Move) {
        let attacker = self.board.squares[mv.from()];
        self.list.push(mv, capture_score(mv.captured(), attacker));
    }

    fn en_passant(&mut self, mv: Move) {
        self.list.push(mv, EN_PASSANT_SCORE);
    }

    /// Pawn push or capture; four moves when it reaches the last rank
    fn pawn_move(&mut self, side: usize, from: usize, to: usize, captured: u8) {
        let promotion_rank = if side == WHITE { RANK_7 } else { RANK_2 };
        if rank_of(from) == promotion_rank {
            for &promoted in &PROMOTIONS[side] {
                self.add(Move::new(from, to, captured, promoted, 0));
            }
        } else {
            self.add(Move::new(from, to, captured, EMPTY, 0));
        }
    }

    fn add(&mut self, mv: Move) {
        if mv.is_capture() {
            self.capture(mv);
        } else {
            self.quiet(mv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::KIWIPETE;
    use crate::ordering::{FIRST_KILLER_SCORE, CAPTURE_BASE};

    fn sq(name: &str) -> usize {
        parse_square(name).expect("valid square")
    }

    fn uci_moves(board: &Board, only_captures: bool) -> Vec<String> {
        let mut list = MoveList::new();
        MoveGenerator::new().generate_moves(board, only_captures, &SearchHeuristics::new(), &mut list);
        let mut moves: Vec<String> = list.iter().map(|m| m.mv.to_uci()).collect();
        moves.sort();
        moves
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let board = Board::new();
        let moves = uci_moves(&board, false);
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&"e2e4".to_string()));
        assert!(moves.contains(&"g1f3".to_string()));
        assert!(uci_moves(&board, true).is_empty());
    }

    #[test]
    fn kiwipete_legal_moves() {
        let mut board = Board::from_fen(KIWIPETE).expect("FEN should parse");
        let legal = MoveGenerator::new().legal_moves(&mut board);
        assert_eq!(legal.len(), 48);
        assert_eq!(legal.iter().filter(|mv| mv.is_castle()).count(), 2);
        assert_eq!(legal.iter().filter(|mv| mv.is_capture()).count(), 8);
        assert_eq!(board.to_fen(), KIWIPETE);
    }

    #[test]
    fn double_push_sets_pawn_start_flag() {
        let board = Board::new();
        let list = MoveGenerator::new().generate_all(&board);
        let e4 = list.iter().map(|m| m.mv).find(|mv| mv.to() == sq("e4")).expect("e2e4 generated");
        assert!(e4.is_pawn_start());
        let e3 = list.iter().map(|m| m.mv).find(|mv| mv.to() == sq("e3")).expect("e2e3 generated");
        assert!(!e3.is_pawn_start());
    }

    #[test]
    fn promotions_emit_four_pieces() {
        let board = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let moves = uci_moves(&board, false);
        for promo in ["a7a8q", "a7a8r", "a7a8b", "a7a8n", "a7b8q", "a7b8r", "a7b8b", "a7b8n"] {
            assert!(moves.contains(&promo.to_string()), "missing {}", promo);
        }

        let captures_only = uci_moves(&board, true);
        assert_eq!(captures_only.len(), 8);
    }

    #[test]
    fn black_promotions() {
        let board = Board::from_fen("4k3/8/8/8/8/8/p7/4K3 b - - 0 1").expect("FEN should parse");
        let list = MoveGenerator::new().generate_all(&board);
        let promos: Vec<u8> = list.iter().filter(|m| m.mv.is_promotion()).map(|m| m.mv.promoted()).collect();
        assert_eq!(promos, vec![BLACK_QUEEN, BLACK_ROOK, BLACK_BISHOP, BLACK_KNIGHT]);
    }

    #[test]
    fn en_passant_is_generated_and_scored() {
        let board = Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
            .expect("FEN should parse");
        let list = MoveGenerator::new().generate_all(&board);
        let ep: Vec<_> = list.iter().filter(|m| m.mv.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].mv.to_uci(), "e5f6");
        assert_eq!(ep[0].score, EN_PASSANT_SCORE);
        assert!(uci_moves(&board, true).contains(&"e5f6".to_string()));
    }

    #[test]
    fn castling_requires_empty_and_safe_path() {
        let open = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let moves = uci_moves(&open, false);
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        // f1 attacked by the rook on f8: no king side castling
        let attacked = Board::from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").expect("FEN should parse");
        let moves = uci_moves(&attacked, false);
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        // b1 occupied blocks queen side only; b1 attacked does not matter
        let blocked = Board::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").expect("FEN should parse");
        let moves = uci_moves(&blocked, false);
        assert!(!moves.contains(&"e1c1".to_string()));
        assert!(moves.contains(&"e1g1".to_string()));

        let b_file = Board::from_fen("1r2k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1").expect("FEN should parse");
        assert!(uci_moves(&b_file, false).contains(&"e1c1".to_string()));

        // in check: neither side
        let checked = Board::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let moves = uci_moves(&checked, false);
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));

        let black = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").expect("FEN should parse");
        let moves = uci_moves(&black, false);
        assert!(moves.contains(&"e8g8".to_string()));
        assert!(moves.contains(&"e8c8".to_string()));
    }

    #[test]
    fn captures_outrank_quiet_moves_and_killers_apply() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let mut heuristics = SearchHeuristics::new();
        let killer = Move::quiet(E1, sq("d2"));
        heuristics.store_killer(0, killer);

        let mut list = MoveList::new();
        MoveGenerator::new().generate_moves(&board, false, &heuristics, &mut list);

        let capture = *list.iter().find(|m| m.mv.is_capture()).expect("exd5 generated");
        assert!(capture.score > CAPTURE_BASE);
        let k = *list.iter().find(|m| m.mv == killer).expect("killer generated");
        assert_eq!(k.score, FIRST_KILLER_SCORE);
        assert_eq!(list.pick_next(0), capture.mv);
        assert_eq!(list.pick_next(1), killer);
    }

    #[test]
    fn parse_move_matches_generated_moves() {
        let generator = MoveGenerator::new();
        let board = Board::new();
        let mv = generator.parse_move(&board, "e2e4").expect("legal move");
        assert!(mv.is_pawn_start());
        assert!(generator.parse_move(&board, "e2e5").is_err());
        assert!(generator.parse_move(&board, "z2e4").is_err());
        assert!(generator.parse_move(&board, "e2").is_err());

        let promo = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let knight = generator.parse_move(&promo, "a7b8n").expect("capture promotion");
        assert_eq!(knight.promoted(), WHITE_KNIGHT);
        assert_eq!(knight.captured(), BLACK_KNIGHT);
        assert!(generator.parse_move(&promo, "a7a8").is_err());
        assert!(generator.parse_move(&promo, "a7a8k").is_err());
    }

    #[test]
    fn legal_moves_filter_self_check() {
        // the e2 rook is pinned to the king by the e8 rook
        let mut board = Board::from_fen("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1").expect("FEN should parse");
        let legal = MoveGenerator::new().legal_moves(&mut board);
        let rook_moves: Vec<_> = legal.iter().filter(|mv| mv.from() == sq("e2")).collect();
        assert_eq!(rook_moves.len(), 6);
        assert!(rook_moves.iter().all(|mv| file_of(mv.to()) == 4));
        assert!(MoveGenerator::new().move_exists(&mut board, Move::capture(sq("e2"), sq("e8"), BLACK_ROOK)));
        assert!(!MoveGenerator::new().move_exists(&mut board, Move::quiet(sq("e2"), sq("d2"))));
    }
}
