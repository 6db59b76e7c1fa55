//! Board Representation Module
//!
//! The canonical position is the padded `squares` array. Everything else on
//! `Board` is derived from it and kept in step incrementally by
//! `make_move` / `unmake_move`: piece lists, pawn bitboards, material and
//! piece-class counters, king squares and the Zobrist key.
//! `check_board` recomputes all of it from scratch for tests.

use crate::attack::is_square_attacked;
use crate::bitboard::{count_bits, set_bit, squares};
use crate::error::{ChessError, ChessResult};
use crate::moves::Move;
use crate::square::*;
use crate::types::*;
use crate::zobrist::keys;
use tracing::debug;

/// Starting position FEN
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling rights that survive a move touching each square.
/// `castle_perm &= CASTLE_PERM_MASK[from] & CASTLE_PERM_MASK[to]`
pub static CASTLE_PERM_MASK: [u8; BOARD_SQUARES] = init_castle_perm_mask();

const fn init_castle_perm_mask() -> [u8; BOARD_SQUARES] {
    let mut mask = [15u8; BOARD_SQUARES];
    mask[A1] = 15 & !CASTLE_WQ;
    mask[E1] = 15 & !(CASTLE_WK | CASTLE_WQ);
    mask[H1] = 15 & !CASTLE_WK;
    mask[A8] = 15 & !CASTLE_BQ;
    mask[E8] = 15 & !(CASTLE_BK | CASTLE_BQ);
    mask[H8] = 15 & !CASTLE_BK;
    mask
}

const BACK_RANK: [u8; 8] = [
    WHITE_ROOK, WHITE_KNIGHT, WHITE_BISHOP, WHITE_QUEEN,
    WHITE_KING, WHITE_BISHOP, WHITE_KNIGHT, WHITE_ROOK,
];

/// State needed to take back one half-move
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UndoRecord {
    pub mv: Move,
    pub castle_perm: u8,
    pub en_passant: Option<usize>,
    pub fifty_move: u32,
    pub pos_key: u64,
    /// Piece-list slot the captured piece was removed from
    pub captured_slot: u8,
    /// Piece-list slot of a promoting pawn
    pub pawn_slot: u8,
}

/// Chess board representation
#[derive(Clone, Debug)]
pub struct Board {
    /// Padded 10x12 array of piece ids; `OFFBOARD` on the border
    pub squares: [u8; BOARD_SQUARES],
    /// Pawn occupancy per colour, plus both (dense square bits)
    pub pawns: [u64; 3],
    pub king_sq: [usize; 2],
    pub side: usize,
    pub en_passant: Option<usize>,
    /// Half-moves since the last pawn move or capture
    pub fifty_move: u32,
    pub fullmove_number: u32,
    /// Half-moves made since the search root
    pub ply: usize,
    /// Bitmask of CASTLE_* rights
    pub castle_perm: u8,
    pub pos_key: u64,
    pub piece_count: [usize; PIECE_TYPES],
    /// Non-pawn pieces per colour (kings included)
    pub big_pieces: [u32; 2],
    pub major_pieces: [u32; 2],
    pub minor_pieces: [u32; 2],
    pub material: [i32; 2],
    /// Squares of each piece type; valid up to `piece_count[piece]`
    pub piece_list: [[usize; MAX_PIECES_PER_TYPE]; PIECE_TYPES],
    pub(crate) history: Vec<UndoRecord>,
}

impl Board {
    /// Create a new board with the starting position
    pub fn new() -> Self {
        let mut board = Board::empty();

        for (file, &piece) in BACK_RANK.iter().enumerate() {
            board.squares[fr_to_sq(file, RANK_1)] = piece;
            board.squares[fr_to_sq(file, RANK_2)] = WHITE_PAWN;
            board.squares[fr_to_sq(file, RANK_7)] = BLACK_PAWN;
            board.squares[fr_to_sq(file, RANK_8)] = swap_colour(piece);
        }
        board.castle_perm = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;
        board.update_lists_material();
        board.pos_key = board.generate_position_key();

        board
    }

    /// A board with no pieces: playing squares `EMPTY`, border `OFFBOARD`
    fn empty() -> Self {
        let mut squares = [OFFBOARD; BOARD_SQUARES];
        for &sq in SQ64_TO_SQ120.iter() {
            squares[sq] = EMPTY;
        }

        Board {
            squares,
            pawns: [0; 3],
            king_sq: [NO_SQ; 2],
            side: WHITE,
            en_passant: None,
            fifty_move: 0,
            fullmove_number: 1,
            ply: 0,
            castle_perm: 0,
            pos_key: 0,
            piece_count: [0; PIECE_TYPES],
            big_pieces: [0; 2],
            major_pieces: [0; 2],
            minor_pieces: [0; 2],
            material: [0; 2],
            piece_list: [[NO_SQ; MAX_PIECES_PER_TYPE]; PIECE_TYPES],
            history: Vec::with_capacity(MAX_GAME_MOVES),
        }
    }

    /// Create a board from a FEN string
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ChessError::fen(format!("expected at least 4 fields, found {}", parts.len())));
        }

        let mut board = Board::empty();

        // Piece placement, rank 8 first
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::fen(format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(ChessError::fen(format!("bad empty-square count '{}'", c)));
                    }
                    file += skip as usize;
                } else {
                    let piece = fen_to_piece(c).ok_or(ChessError::InvalidPiece(c))?;
                    if file >= 8 {
                        return Err(ChessError::fen(format!("rank {} is too long", rank + 1)));
                    }
                    board.squares[fr_to_sq(file, rank)] = piece;
                    file += 1;
                }
            }
            if file != 8 {
                return Err(ChessError::fen(format!("rank {} covers {} files", rank + 1, file)));
            }
        }

        // Active colour
        board.side = match parts[1] {
            "w" => WHITE,
            "b" => BLACK,
            other => return Err(ChessError::fen(format!("bad side to move '{}'", other))),
        };

        // Castling rights
        if parts[2] != "-" {
            for c in parts[2].chars() {
                board.castle_perm |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(ChessError::fen(format!("bad castling flag '{}'", c))),
                };
            }
        }

        // En passant square
        if parts[3] != "-" {
            let sq = parse_square(parts[3]).ok_or_else(|| ChessError::InvalidSquare(parts[3].to_string()))?;
            let expected_rank = if board.side == WHITE { 5 } else { 2 };
            if rank_of(sq) != expected_rank {
                return Err(ChessError::fen(format!("en passant square {} on the wrong rank", parts[3])));
            }
            let (behind, enemy_pawn) = if board.side == WHITE { (sq - 10, BLACK_PAWN) } else { (sq + 10, WHITE_PAWN) };
            if board.squares[sq] != EMPTY || board.squares[behind] != enemy_pawn {
                return Err(ChessError::fen(format!("no pawn can be taken en passant on {}", parts[3])));
            }
            board.en_passant = Some(sq);
        }

        if let Some(text) = parts.get(4) {
            board.fifty_move = text
                .parse()
                .map_err(|_| ChessError::fen(format!("bad halfmove clock '{}'", text)))?;
        }
        if let Some(text) = parts.get(5) {
            board.fullmove_number = text
                .parse()
                .map_err(|_| ChessError::fen(format!("bad fullmove number '{}'", text)))?;
        }

        board.validate_piece_counts()?;
        board.castle_perm &= board.undisturbed_castle_rights();
        board.update_lists_material();
        if is_square_attacked(&board, board.king_sq[board.side ^ 1], board.side) {
            return Err(ChessError::fen("the side not to move is in check"));
        }
        board.pos_key = board.generate_position_key();

        debug!(fen, key = board.pos_key, "position loaded");
        Ok(board)
    }

    /// Load a position in place. On error the board is left untouched.
    pub fn set_fen(&mut self, fen: &str) -> ChessResult<()> {
        *self = Board::from_fen(fen)?;
        Ok(())
    }

    /// Exactly one king per side, and no piece type past the list capacity
    fn validate_piece_counts(&self) -> ChessResult<()> {
        let mut counts = [0usize; PIECE_TYPES];
        for &sq in SQ64_TO_SQ120.iter() {
            counts[self.squares[sq] as usize] += 1;
        }

        for (king, colour) in [(WHITE_KING, "white"), (BLACK_KING, "black")] {
            match counts[king as usize] {
                0 => return Err(ChessError::MissingKing { colour }),
                1 => {}
                _ => return Err(ChessError::TooManyKings { colour }),
            }
        }

        for piece in WHITE_PAWN..=BLACK_KING {
            if counts[piece as usize] > MAX_PIECES_PER_TYPE {
                let c = piece_to_fen(piece).unwrap_or('?');
                return Err(ChessError::TooManyPieces { piece: c });
            }
        }

        Ok(())
    }

    /// Castling rights whose king and rook still stand on their home squares
    fn undisturbed_castle_rights(&self) -> u8 {
        let mut rights = 0;
        if self.squares[E1] == WHITE_KING {
            if self.squares[H1] == WHITE_ROOK { rights |= CASTLE_WK; }
            if self.squares[A1] == WHITE_ROOK { rights |= CASTLE_WQ; }
        }
        if self.squares[E8] == BLACK_KING {
            if self.squares[H8] == BLACK_ROOK { rights |= CASTLE_BK; }
            if self.squares[A8] == BLACK_ROOK { rights |= CASTLE_BQ; }
        }
        rights
    }

    /// Rebuild piece lists, pawn bitboards and counters from `squares`
    fn update_lists_material(&mut self) {
        self.pawns = [0; 3];
        self.king_sq = [NO_SQ; 2];
        self.piece_count = [0; PIECE_TYPES];
        self.big_pieces = [0; 2];
        self.major_pieces = [0; 2];
        self.minor_pieces = [0; 2];
        self.material = [0; 2];

        for &sq in SQ64_TO_SQ120.iter() {
            let piece = self.squares[sq];
            if piece == EMPTY {
                continue;
            }
            let p = piece as usize;
            let colour = piece_colour(piece);

            if PIECE_BIG[p] { self.big_pieces[colour] += 1; }
            if PIECE_MAJOR[p] { self.major_pieces[colour] += 1; }
            if PIECE_MINOR[p] { self.minor_pieces[colour] += 1; }
            self.material[colour] += PIECE_VALUES[p];

            debug_assert!(self.piece_count[p] < MAX_PIECES_PER_TYPE);
            self.piece_list[p][self.piece_count[p]] = sq;
            self.piece_count[p] += 1;

            if PIECE_KING[p] {
                self.king_sq[colour] = sq;
            }
            if PIECE_PAWN[p] {
                set_bit(&mut self.pawns[colour], sq64(sq));
                set_bit(&mut self.pawns[BOTH], sq64(sq));
            }
        }
    }

    /// Compute the Zobrist key of the position from scratch
    pub fn generate_position_key(&self) -> u64 {
        let k = keys();
        let mut key = 0u64;

        for &sq in SQ64_TO_SQ120.iter() {
            let piece = self.squares[sq];
            if piece != EMPTY {
                key ^= k.piece(piece, sq);
            }
        }

        if self.side == BLACK {
            key ^= k.side_key;
        }

        if let Some(ep) = self.en_passant {
            key ^= k.en_passant(ep);
        }

        key ^= k.castle(self.castle_perm);

        key
    }

    /// Generate FEN string from current board state
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let piece = self.squares[fr_to_sq(file, rank)];
                if piece == EMPTY {
                    empty_count += 1;
                } else {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    if let Some(c) = piece_to_fen(piece) {
                        fen.push(c);
                    }
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side == WHITE { 'w' } else { 'b' });

        fen.push(' ');
        if self.castle_perm == 0 {
            fen.push('-');
        } else {
            if self.castle_perm & CASTLE_WK != 0 { fen.push('K'); }
            if self.castle_perm & CASTLE_WQ != 0 { fen.push('Q'); }
            if self.castle_perm & CASTLE_BK != 0 { fen.push('k'); }
            if self.castle_perm & CASTLE_BQ != 0 { fen.push('q'); }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.fifty_move, self.fullmove_number));

        fen
    }

    #[inline]
    pub fn piece_at(&self, sq: usize) -> u8 {
        self.squares[sq]
    }

    /// Squares currently holding `piece`
    #[inline]
    pub fn piece_squares(&self, piece: u8) -> &[usize] {
        let p = piece as usize;
        &self.piece_list[p][..self.piece_count[p]]
    }

    /// Number of half-moves on the undo stack
    #[inline]
    pub fn history_ply(&self) -> usize {
        self.history.len()
    }

    /// Undo records, oldest first
    pub fn history(&self) -> &[UndoRecord] {
        &self.history
    }

    /// True if the side to move is in check
    pub fn in_check(&self) -> bool {
        is_square_attacked(self, self.king_sq[self.side], self.side ^ 1)
    }

    /// Current key seen before, since the last pawn move or capture
    pub fn is_repetition(&self) -> bool {
        let len = self.history.len();
        let start = len.saturating_sub(self.fifty_move as usize);
        self.history[start..].iter().any(|undo| undo.pos_key == self.pos_key)
    }

    /// Check if 50-move rule applies (draw)
    pub fn is_fifty_move_draw(&self) -> bool {
        self.fifty_move >= 100
    }

    /// Colour-flipped copy: ranks reversed, piece colours and castling
    /// rights swapped, other side to move. History is not carried over.
    pub fn mirror(&self) -> Board {
        let mut mirrored = Board::empty();

        for &sq in SQ64_TO_SQ120.iter() {
            mirrored.squares[mirror_sq120(sq)] = swap_colour(self.squares[sq]);
        }

        mirrored.side = self.side ^ 1;
        mirrored.en_passant = self.en_passant.map(mirror_sq120);
        mirrored.fifty_move = self.fifty_move;
        mirrored.fullmove_number = self.fullmove_number;

        let perm = self.castle_perm;
        if perm & CASTLE_WK != 0 { mirrored.castle_perm |= CASTLE_BK; }
        if perm & CASTLE_WQ != 0 { mirrored.castle_perm |= CASTLE_BQ; }
        if perm & CASTLE_BK != 0 { mirrored.castle_perm |= CASTLE_WK; }
        if perm & CASTLE_BQ != 0 { mirrored.castle_perm |= CASTLE_WQ; }

        mirrored.update_lists_material();
        mirrored.pos_key = mirrored.generate_position_key();
        mirrored
    }

    /// Recompute every derived structure from `squares` and compare with the
    /// maintained one. Reports the first mismatch found.
    pub fn check_board(&self) -> ChessResult<()> {
        let mut piece_count = [0usize; PIECE_TYPES];
        let mut big = [0u32; 2];
        let mut major = [0u32; 2];
        let mut minor = [0u32; 2];
        let mut material = [0i32; 2];
        let mut pawns = [0u64; 3];

        for sq in 0..BOARD_SQUARES {
            let piece = self.squares[sq];
            if !is_on_board(sq) {
                if piece != OFFBOARD {
                    return Err(ChessError::inconsistent(format!("border square {} holds {}", sq, piece)));
                }
                continue;
            }
            if piece == EMPTY {
                continue;
            }
            if !is_piece(piece) {
                return Err(ChessError::inconsistent(format!("square {} holds bad piece {}", square_name(sq), piece)));
            }

            let p = piece as usize;
            let colour = piece_colour(piece);
            piece_count[p] += 1;
            if PIECE_BIG[p] { big[colour] += 1; }
            if PIECE_MAJOR[p] { major[colour] += 1; }
            if PIECE_MINOR[p] { minor[colour] += 1; }
            material[colour] += PIECE_VALUES[p];
            if PIECE_PAWN[p] {
                set_bit(&mut pawns[colour], sq64(sq));
                set_bit(&mut pawns[BOTH], sq64(sq));
            }
        }

        for piece in WHITE_PAWN..=BLACK_KING {
            let p = piece as usize;
            if piece_count[p] != self.piece_count[p] {
                return Err(ChessError::inconsistent(format!(
                    "piece {} count {} but {} on squares", piece, self.piece_count[p], piece_count[p]
                )));
            }
            let list = self.piece_squares(piece);
            for (i, &sq) in list.iter().enumerate() {
                if self.squares[sq] != piece {
                    return Err(ChessError::inconsistent(format!(
                        "piece list of {} names {} which holds {}", piece, square_name(sq), self.squares[sq]
                    )));
                }
                if list[..i].contains(&sq) {
                    return Err(ChessError::inconsistent(format!(
                        "piece list of {} names {} twice", piece, square_name(sq)
                    )));
                }
            }
        }

        if big != self.big_pieces || major != self.major_pieces || minor != self.minor_pieces {
            return Err(ChessError::inconsistent("piece class counters"));
        }
        if material != self.material {
            return Err(ChessError::inconsistent(format!(
                "material {:?}, recomputed {:?}", self.material, material
            )));
        }
        if pawns != self.pawns {
            return Err(ChessError::inconsistent("pawn bitboards"));
        }
        if count_bits(self.pawns[WHITE]) as usize != self.piece_count[WHITE_PAWN as usize]
            || count_bits(self.pawns[BLACK]) as usize != self.piece_count[BLACK_PAWN as usize]
        {
            return Err(ChessError::inconsistent("pawn bitboard population"));
        }
        for (colour, pawn) in [(WHITE, WHITE_PAWN), (BLACK, BLACK_PAWN)] {
            for s in squares(self.pawns[colour]) {
                if self.squares[sq120(s)] != pawn {
                    return Err(ChessError::inconsistent(format!("pawn bit set on {}", square_name(sq120(s)))));
                }
            }
        }

        if piece_count[WHITE_KING as usize] != 1 || piece_count[BLACK_KING as usize] != 1 {
            return Err(ChessError::inconsistent("each side needs exactly one king"));
        }
        if self.squares[self.king_sq[WHITE]] != WHITE_KING || self.squares[self.king_sq[BLACK]] != BLACK_KING {
            return Err(ChessError::inconsistent("king square out of date"));
        }

        if self.side != WHITE && self.side != BLACK {
            return Err(ChessError::inconsistent(format!("side {}", self.side)));
        }
        if let Some(ep) = self.en_passant {
            let expected_rank = if self.side == WHITE { 5 } else { 2 };
            if !is_on_board(ep) || rank_of(ep) != expected_rank {
                return Err(ChessError::inconsistent(format!("en passant square {}", square_name(ep))));
            }
        }
        if self.castle_perm & !self.undisturbed_castle_rights() != 0 {
            return Err(ChessError::inconsistent(format!(
                "castle rights {:#06b} with king or rook moved", self.castle_perm
            )));
        }

        if self.generate_position_key() != self.pos_key {
            return Err(ChessError::inconsistent("position key"));
        }

        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
