//! Mailbox Chess - engine core
//!
//! A chess engine core built around a padded 10x12 board with:
//! - Incrementally maintained piece lists, pawn bitboards and Zobrist keys
//! - Pseudo-legal move generation, legality checked on make
//! - Iterative deepening alpha-beta with quiescence search
//! - Best-move table, killer and history move ordering
//! - Static evaluation from material, piece-square tables and pawn structure
//!
//! There is no protocol front-end here; callers drive `Board`,
//! `MoveGenerator` and `SearchEngine` directly.

pub mod types;
pub mod square;
pub mod bitboard;
pub mod error;
pub mod zobrist;
pub mod moves;
pub mod board;
pub mod make_move;
pub mod attack;
pub mod ordering;
pub mod move_generator;
pub mod evaluation;
pub mod pv_table;
pub mod limits;
pub mod search;
pub mod perft;

pub use board::{Board, STARTING_FEN};
pub use error::{ChessError, ChessResult};
pub use limits::{SearchLimits, TimeControl};
pub use move_generator::MoveGenerator;
pub use moves::Move;
pub use search::{DepthReport, SearchConfig, SearchEngine, SearchOutcome};
