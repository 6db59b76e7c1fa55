//! Type definitions and constants
//!
//! Piece identifiers, colours, castling bits and the per-piece property
//! tables the board, generator and evaluator index into.

/// Piece identifiers (0 = empty, 1..=6 white, 7..=12 black)
pub const EMPTY: u8 = 0;
pub const WHITE_PAWN: u8 = 1;
pub const WHITE_KNIGHT: u8 = 2;
pub const WHITE_BISHOP: u8 = 3;
pub const WHITE_ROOK: u8 = 4;
pub const WHITE_QUEEN: u8 = 5;
pub const WHITE_KING: u8 = 6;
pub const BLACK_PAWN: u8 = 7;
pub const BLACK_KNIGHT: u8 = 8;
pub const BLACK_BISHOP: u8 = 9;
pub const BLACK_ROOK: u8 = 10;
pub const BLACK_QUEEN: u8 = 11;
pub const BLACK_KING: u8 = 12;

/// Square content of the padding around the 8x8 area
pub const OFFBOARD: u8 = 100;

pub const PIECE_TYPES: usize = 13;

/// Colours, also used to index per-side arrays
pub const WHITE: usize = 0;
pub const BLACK: usize = 1;
pub const BOTH: usize = 2;

/// Castling rights bitmasks
pub const CASTLE_WK: u8 = 1;  // White kingside
pub const CASTLE_WQ: u8 = 2;  // White queenside
pub const CASTLE_BK: u8 = 4;  // Black kingside
pub const CASTLE_BQ: u8 = 8;  // Black queenside

pub const MAX_GAME_MOVES: usize = 2048;
pub const MAX_POSITION_MOVES: usize = 256;
pub const MAX_DEPTH: usize = 64;

/// Most copies of one piece type a legal position can hold (2 + 8 promotions)
pub const MAX_PIECES_PER_TYPE: usize = 10;

pub const PIECE_VALUES: [i32; PIECE_TYPES] = [
    0, 100, 325, 325, 550, 1000, 50000, 100, 325, 325, 550, 1000, 50000,
];

/// Owning colour per piece; BOTH for EMPTY
pub const PIECE_COLOUR: [usize; PIECE_TYPES] = [
    BOTH, WHITE, WHITE, WHITE, WHITE, WHITE, WHITE, BLACK, BLACK, BLACK, BLACK, BLACK, BLACK,
];

/// Every non-pawn piece
pub const PIECE_BIG: [bool; PIECE_TYPES] = [
    false, false, true, true, true, true, true, false, true, true, true, true, true,
];

/// Rooks, queens and kings
pub const PIECE_MAJOR: [bool; PIECE_TYPES] = [
    false, false, false, false, true, true, true, false, false, false, true, true, true,
];

/// Knights and bishops
pub const PIECE_MINOR: [bool; PIECE_TYPES] = [
    false, false, true, true, false, false, false, false, true, true, false, false, false,
];

pub const PIECE_PAWN: [bool; PIECE_TYPES] = [
    false, true, false, false, false, false, false, true, false, false, false, false, false,
];

pub const PIECE_KNIGHT: [bool; PIECE_TYPES] = [
    false, false, true, false, false, false, false, false, true, false, false, false, false,
];

pub const PIECE_KING: [bool; PIECE_TYPES] = [
    false, false, false, false, false, false, true, false, false, false, false, false, true,
];

/// Pieces that attack along files and ranks
pub const PIECE_ROOK_QUEEN: [bool; PIECE_TYPES] = [
    false, false, false, false, true, true, false, false, false, false, true, true, false,
];

/// Pieces that attack along diagonals
pub const PIECE_BISHOP_QUEEN: [bool; PIECE_TYPES] = [
    false, false, false, true, false, true, false, false, false, true, false, true, false,
];

pub const PIECE_SLIDES: [bool; PIECE_TYPES] = [
    false, false, false, true, true, true, false, false, false, true, true, true, false,
];

/// Check that a value names a real piece (not EMPTY, not OFFBOARD)
#[inline]
pub fn is_piece(piece: u8) -> bool {
    (WHITE_PAWN..=BLACK_KING).contains(&piece)
}

/// Colour of a piece; BOTH for EMPTY
#[inline]
pub fn piece_colour(piece: u8) -> usize {
    PIECE_COLOUR[piece as usize]
}

/// Same piece kind in the opposite colour
#[inline]
pub fn swap_colour(piece: u8) -> u8 {
    match piece {
        WHITE_PAWN..=WHITE_KING => piece + 6,
        BLACK_PAWN..=BLACK_KING => piece - 6,
        _ => piece,
    }
}

/// FEN piece character to piece value
pub fn fen_to_piece(c: char) -> Option<u8> {
    match c {
        'P' => Some(WHITE_PAWN),
        'N' => Some(WHITE_KNIGHT),
        'B' => Some(WHITE_BISHOP),
        'R' => Some(WHITE_ROOK),
        'Q' => Some(WHITE_QUEEN),
        'K' => Some(WHITE_KING),
        'p' => Some(BLACK_PAWN),
        'n' => Some(BLACK_KNIGHT),
        'b' => Some(BLACK_BISHOP),
        'r' => Some(BLACK_ROOK),
        'q' => Some(BLACK_QUEEN),
        'k' => Some(BLACK_KING),
        _ => None,
    }
}

/// Piece value to FEN character
pub fn piece_to_fen(piece: u8) -> Option<char> {
    match piece {
        WHITE_PAWN => Some('P'),
        WHITE_KNIGHT => Some('N'),
        WHITE_BISHOP => Some('B'),
        WHITE_ROOK => Some('R'),
        WHITE_QUEEN => Some('Q'),
        WHITE_KING => Some('K'),
        BLACK_PAWN => Some('p'),
        BLACK_KNIGHT => Some('n'),
        BLACK_BISHOP => Some('b'),
        BLACK_ROOK => Some('r'),
        BLACK_QUEEN => Some('q'),
        BLACK_KING => Some('k'),
        _ => None,
    }
}
