//! Perft: legal move path enumeration
//!
//! Counts leaf positions reachable through moves `Board::make_move`
//! accepts. Matching published node counts checks move generation and
//! make/unmake together.

use crate::board::Board;
use crate::move_generator::MoveGenerator;
use crate::moves::{Move, MoveList};
use crate::ordering::SearchHeuristics;
use tracing::debug;

/// Leaf statistics for a perft run, counted on the move into each leaf
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
    }
}

/// Number of leaf positions at `depth`
pub fn perft(board: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let generator = MoveGenerator::new();
    let heuristics = SearchHeuristics::new();
    perft_nodes(&generator, &heuristics, board, depth)
}

fn perft_nodes(generator: &MoveGenerator, heuristics: &SearchHeuristics, board: &mut Board, depth: usize) -> u64 {
    let mut list = MoveList::new();
    generator.generate_moves(board, false, heuristics, &mut list);

    let mut nodes = 0;
    for scored in list.iter() {
        if !board.make_move(scored.mv) {
            continue;
        }
        nodes += if depth == 1 { 1 } else { perft_nodes(generator, heuristics, board, depth - 1) };
        board.unmake_move();
    }
    nodes
}

/// Leaf count with a breakdown by move kind
pub fn perft_counts(board: &mut Board, depth: usize) -> PerftCounts {
    if depth == 0 {
        return PerftCounts { nodes: 1, ..PerftCounts::default() };
    }

    let generator = MoveGenerator::new();
    let mut total = PerftCounts::default();
    for mv in generator.legal_moves(board) {
        board.make_move(mv);
        total.merge(perft_recurse(&generator, board, mv, depth - 1));
        board.unmake_move();
    }
    total
}

fn perft_recurse(generator: &MoveGenerator, board: &mut Board, last: Move, depth: usize) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            captures: last.is_capture() as u64,
            en_passant: last.is_en_passant() as u64,
            castles: last.is_castle() as u64,
            promotions: last.is_promotion() as u64,
            checks: board.in_check() as u64,
        };
    }

    let mut counts = PerftCounts::default();
    for mv in generator.legal_moves(board) {
        board.make_move(mv);
        counts.merge(perft_recurse(generator, board, mv, depth - 1));
        board.unmake_move();
    }
    counts
}

/// Leaf count under each legal root move, in generation order
pub fn divide(board: &mut Board, depth: usize) -> Vec<(Move, u64)> {
    let generator = MoveGenerator::new();
    let mut result = Vec::new();

    for mv in generator.legal_moves(board) {
        board.make_move(mv);
        let nodes = perft(board, depth.saturating_sub(1));
        board.unmake_move();
        debug!(mv = %mv, nodes, "divide");
        result.push((mv, nodes));
    }

    result
}
