//! Error types for position loading and move parsing
//!
//! Illegal moves during search are not errors (`Board::make_move` reports
//! them as `false`) and neither is search cancellation.

use thiserror::Error;

/// Errors that can occur at the edges of the engine core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// Structurally broken FEN text
    #[error("Invalid FEN: {reason}")]
    InvalidFen { reason: String },

    /// Unknown character in the piece placement field
    #[error("Invalid piece character '{0}' in FEN")]
    InvalidPiece(char),

    /// Square text that does not name a board square
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    /// A side has no king
    #[error("No {colour} king on the board")]
    MissingKing { colour: &'static str },

    /// A side has more than one king
    #[error("More than one {colour} king on the board")]
    TooManyKings { colour: &'static str },

    /// More copies of a piece than the piece lists hold
    #[error("Too many pieces of type '{piece}'")]
    TooManyPieces { piece: char },

    /// Derived board state disagrees with the square contents
    #[error("Board inconsistent: {what}")]
    Inconsistent { what: String },

    /// Coordinate move text that is malformed or not legal here
    #[error("Invalid move: {0}")]
    InvalidMove(String),
}

impl ChessError {
    pub(crate) fn fen(reason: impl Into<String>) -> Self {
        ChessError::InvalidFen { reason: reason.into() }
    }

    pub(crate) fn inconsistent(what: impl Into<String>) -> Self {
        ChessError::Inconsistent { what: what.into() }
    }
}

/// Result type alias for engine operations
pub type ChessResult<T> = Result<T, ChessError>;
