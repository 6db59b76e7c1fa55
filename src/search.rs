//! Search Engine Module
//!
//! Iterative deepening over a negamax alpha-beta search with:
//! - Quiescence search over captures and promotions
//! - Check extensions
//! - Best-move table hints, MVV-LVA, killer and history ordering
//! - Optional null move pruning
//! - Cooperative cancellation by deadline or stop signal
//!
//! The board is searched in place: every move made below the root is taken
//! back before a call returns, including after cancellation.

use crate::board::Board;
use crate::evaluation::evaluate;
use crate::limits::SearchLimits;
use crate::move_generator::MoveGenerator;
use crate::moves::{Move, MoveList};
use crate::ordering::{SearchHeuristics, PV_MOVE_SCORE};
use crate::pv_table::{PvTable, DEFAULT_PV_ENTRIES};
use crate::types::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Score of being mated at the root; mated at ply `n` scores `-MATE + n`
pub const MATE: i32 = 29_000;
pub const INFINITE: i32 = 30_000;

// Null Move Pruning
const NULL_MOVE_REDUCTION: usize = 4;
const NULL_MOVE_MIN_DEPTH: usize = 4;

/// Scores beyond this are mates found within the search horizon
const MATE_BOUND: i32 = MATE - MAX_DEPTH as i32;

// ============================================================================
// CONFIGURATION AND REPORTS
// ============================================================================

#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Slots in the best-move table
    pub pv_entries: usize,
    /// Poll the clock and stop signal when `nodes & mask == 0`
    pub check_interval_mask: u64,
    pub null_move_pruning: bool,
    /// Run `Board::check_board` at every node (debug builds only)
    pub verify_board: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pv_entries: DEFAULT_PV_ENTRIES,
            check_interval_mask: 2047,
            null_move_pruning: false,
            verify_board: cfg!(debug_assertions),
        }
    }
}

/// Per-search counters and cancellation state
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub start: Instant,
    pub deadline: Option<Instant>,
    pub nodes: u64,
    /// Beta cutoffs
    pub fail_high: u64,
    /// Beta cutoffs on the first legal move tried
    pub fail_high_first: u64,
    pub stopped: bool,
}

impl SearchInfo {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            deadline: None,
            nodes: 0,
            fail_high: 0,
            fail_high_first: 0,
            stopped: false,
        }
    }

    /// Share of cutoffs found by the first move, a move-ordering measure
    pub fn fail_high_ratio(&self) -> f32 {
        if self.fail_high == 0 {
            0.0
        } else {
            self.fail_high_first as f32 / self.fail_high as f32
        }
    }
}

/// Result of one completed iterative-deepening depth
#[derive(Clone, Debug, PartialEq)]
pub struct DepthReport {
    pub depth: usize,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
    pub fail_high_ratio: f32,
}

impl DepthReport {
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }
}

/// What `search` hands back
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// None only when the side to move has no legal move
    pub best_move: Option<Move>,
    pub score: i32,
    /// Deepest fully completed depth; 0 if cancelled during depth 1
    pub depth: usize,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// True for scores that encode a forced mate
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > MATE_BOUND
}

fn pv_text(pv: &[Move]) -> String {
    pv.iter().map(|mv| mv.to_uci()).collect::<Vec<_>>().join(" ")
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

pub struct SearchEngine {
    config: SearchConfig,
    move_generator: MoveGenerator,
    heuristics: SearchHeuristics,
    pv_table: PvTable,
    info: SearchInfo,
    stop_signal: Arc<AtomicBool>,
    limits: SearchLimits,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        SearchEngine {
            pv_table: PvTable::new(config.pv_entries),
            config,
            move_generator: MoveGenerator::new(),
            heuristics: SearchHeuristics::new(),
            info: SearchInfo::new(),
            stop_signal: Arc::new(AtomicBool::new(false)),
            limits: SearchLimits::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Counters of the current or last search
    pub fn info(&self) -> &SearchInfo {
        &self.info
    }

    /// A handle that stops the running search from another thread
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }

    /// Forget killers, history and stored best moves
    pub fn clear(&mut self) {
        self.heuristics.clear();
        self.pv_table.clear();
        self.info = SearchInfo::new();
    }

    /// Iterative deepening from depth 1 to `limits.depth`.
    ///
    /// `on_depth` is called after every completed depth. A depth cut short
    /// by the deadline or a stop request is discarded; the outcome is the
    /// deepest completed one.
    pub fn search<F>(&mut self, board: &mut Board, limits: &SearchLimits, mut on_depth: F) -> SearchOutcome
    where
        F: FnMut(&DepthReport),
    {
        self.clear();
        self.info.deadline = limits.deadline(self.info.start);
        self.limits = limits.clone();
        self.stop_signal.store(false, Ordering::Relaxed);
        board.ply = 0;

        info!(
            depth = limits.depth,
            move_time_ms = limits.move_time.map(|t| t.as_millis() as u64),
            fen = %board.to_fen(),
            "search started"
        );

        let mut outcome = SearchOutcome::default();
        let max_depth = limits.depth.clamp(1, MAX_DEPTH);

        for depth in 1..=max_depth {
            let score = self.alpha_beta(board, -INFINITE, INFINITE, depth, true);

            if self.info.stopped {
                debug!(depth, nodes = self.info.nodes, "search stopped before depth completed");
                break;
            }

            let pv = self.pv_line(board, depth);
            let report = DepthReport {
                depth,
                score,
                nodes: self.info.nodes,
                elapsed: self.info.start.elapsed(),
                pv,
                fail_high_ratio: self.info.fail_high_ratio(),
            };

            info!(
                depth,
                score,
                nodes = report.nodes,
                time_ms = report.elapsed.as_millis() as u64,
                fail_high_ratio = report.fail_high_ratio,
                pv = %pv_text(&report.pv),
                "depth complete"
            );

            outcome = SearchOutcome {
                best_move: report.best_move(),
                score,
                depth,
                nodes: report.nodes,
                pv: report.pv.clone(),
            };

            on_depth(&report);
        }

        if outcome.best_move.is_none() {
            outcome.best_move = self.move_generator.legal_moves(board).first().copied();
            if outcome.depth == 0 {
                if let Some(mv) = outcome.best_move {
                    debug!(mv = %mv, "no depth completed, using first legal move");
                }
            }
        }
        outcome.nodes = self.info.nodes;

        debug!(
            best = %outcome.best_move.map(|mv| mv.to_uci()).unwrap_or_else(|| "none".to_string()),
            score = outcome.score,
            depth = outcome.depth,
            nodes = outcome.nodes,
            "search finished"
        );
        outcome
    }

    /// Poll the deadline and stop signals
    fn check_up(&mut self) {
        if self.info.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.info.stopped = true;
        }
        if self.stop_signal.load(Ordering::Relaxed) {
            self.info.stopped = true;
        }
        if self.limits.stop_requested() {
            self.info.stopped = true;
        }
    }

    #[inline]
    fn count_node(&mut self) {
        if self.info.nodes & self.config.check_interval_mask == 0 {
            self.check_up();
        }
        self.info.nodes += 1;
    }

    /// Negamax alpha-beta. Returns a score from the side to move's view;
    /// 0 if the search has been stopped.
    pub fn alpha_beta(&mut self, board: &mut Board, mut alpha: i32, beta: i32, mut depth: usize, allow_null: bool) -> i32 {
        debug_assert!(!self.config.verify_board || board.check_board().is_ok());
        debug_assert!(beta > alpha);

        if depth == 0 {
            return self.quiescence(board, alpha, beta);
        }

        self.count_node();

        if board.ply > 0 && (board.is_repetition() || board.is_fifty_move_draw()) {
            return 0;
        }

        if board.ply > MAX_DEPTH - 1 {
            return evaluate(board);
        }

        let in_check = board.in_check();
        if in_check {
            depth += 1;
        }

        if allow_null
            && self.config.null_move_pruning
            && !in_check
            && board.ply > 0
            && board.big_pieces[board.side] > 1
            && depth >= NULL_MOVE_MIN_DEPTH
        {
            board.make_null_move();
            let score = -self.alpha_beta(board, -beta, -beta + 1, depth - NULL_MOVE_REDUCTION, false);
            board.unmake_null_move();

            if self.info.stopped {
                return 0;
            }
            if score >= beta && !is_mate_score(score) {
                return beta;
            }
        }

        let mut list = MoveList::new();
        self.move_generator.generate_moves(board, false, &self.heuristics, &mut list);

        if let Some(pv_move) = self.pv_table.probe(board.pos_key) {
            list.set_score(pv_move, PV_MOVE_SCORE);
        }

        let old_alpha = alpha;
        let mut best_move = Move::NONE;
        let mut legal = 0;

        for index in 0..list.len() {
            let mv = list.pick_next(index);

            if !board.make_move(mv) {
                continue;
            }
            legal += 1;
            let score = -self.alpha_beta(board, -beta, -alpha, depth - 1, true);
            board.unmake_move();

            if self.info.stopped {
                return 0;
            }

            if score > alpha {
                if score >= beta {
                    if legal == 1 {
                        self.info.fail_high_first += 1;
                    }
                    self.info.fail_high += 1;

                    if !mv.is_capture() {
                        self.heuristics.store_killer(board.ply, mv);
                    }
                    return beta;
                }

                alpha = score;
                best_move = mv;
                if !mv.is_capture() {
                    self.heuristics.add_history(board.squares[mv.from()], mv.to(), depth);
                }
            }
        }

        if legal == 0 {
            return if in_check { -MATE + board.ply as i32 } else { 0 };
        }

        if alpha != old_alpha {
            self.pv_table.store(board.pos_key, best_move);
        }

        alpha
    }

    /// Search captures and promotions until the position is quiet
    pub fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32) -> i32 {
        debug_assert!(!self.config.verify_board || board.check_board().is_ok());

        self.count_node();

        if board.ply > 0 && (board.is_repetition() || board.is_fifty_move_draw()) {
            return 0;
        }

        let stand_pat = evaluate(board);

        if board.ply > MAX_DEPTH - 1 {
            return stand_pat;
        }

        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut list = MoveList::new();
        self.move_generator.generate_moves(board, true, &self.heuristics, &mut list);

        let old_alpha = alpha;
        let mut best_move = Move::NONE;
        let mut legal = 0;

        for index in 0..list.len() {
            let mv = list.pick_next(index);

            if !board.make_move(mv) {
                continue;
            }
            legal += 1;
            let score = -self.quiescence(board, -beta, -alpha);
            board.unmake_move();

            if self.info.stopped {
                return 0;
            }

            if score > alpha {
                if score >= beta {
                    if legal == 1 {
                        self.info.fail_high_first += 1;
                    }
                    self.info.fail_high += 1;
                    return beta;
                }
                alpha = score;
                best_move = mv;
            }
        }

        if alpha != old_alpha {
            self.pv_table.store(board.pos_key, best_move);
        }

        alpha
    }

    /// Follow the best-move table from the current position, at most
    /// `depth` moves. The board is restored before returning.
    pub fn pv_line(&self, board: &mut Board, depth: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(depth);

        while line.len() < depth {
            let Some(mv) = self.pv_table.probe(board.pos_key) else {
                break;
            };
            if !self.move_generator.move_exists(board, mv) {
                break;
            }
            board.make_move(mv);
            line.push(mv);
        }

        for _ in 0..line.len() {
            board.unmake_move();
        }

        line
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::KIWIPETE;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn search_fen(fen: &str, depth: usize) -> SearchOutcome {
        let mut board = Board::from_fen(fen).expect("FEN should parse");
        let mut engine = SearchEngine::default();
        engine.search(&mut board, &SearchLimits::depth(depth), |_| {})
    }

    #[test]
    fn finds_back_rank_mate() {
        init_tracing();
        let outcome = search_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 3);
        assert_eq!(outcome.score, MATE - 1);
        assert_eq!(outcome.best_move.map(|mv| mv.to_uci()), Some("a1a8".to_string()));
        assert_eq!(outcome.pv.len(), 1);
    }

    #[test]
    fn finds_mate_in_two() {
        init_tracing();
        let outcome = search_fen("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1", 4);
        assert_eq!(outcome.score, MATE - 3);
        assert!(outcome.best_move.is_some());
    }

    #[test]
    fn mated_and_stalemated_roots() {
        let mated = search_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", 3);
        assert_eq!(mated.score, -MATE);
        assert_eq!(mated.best_move, None);

        let stalemate = search_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(stalemate.score, 0);
        assert_eq!(stalemate.best_move, None);
    }

    #[test]
    fn prefers_shorter_mates() {
        // mate in one is available alongside slower wins
        let outcome = search_fen("6k1/5ppp/8/8/8/8/5PPP/RR4K1 w - - 0 1", 4);
        assert_eq!(outcome.score, MATE - 1);
    }

    #[test]
    fn wins_hanging_queen() {
        let outcome = search_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1", 2);
        assert_eq!(outcome.best_move.map(|mv| mv.to_uci()), Some("d2d5".to_string()));
        assert!(outcome.score > 400);
    }

    #[test]
    fn search_is_deterministic() {
        let mut engine = SearchEngine::default();
        let mut board = Board::new();
        let first = engine.search(&mut board, &SearchLimits::depth(4), |_| {});
        let second = engine.search(&mut board, &SearchLimits::depth(4), |_| {});
        assert_eq!(first, second);
        assert!(first.best_move.is_some());

        // earlier searches on the same board must not change the next one
        let fresh = SearchEngine::default().search(&mut board, &SearchLimits::depth(4), |_| {});
        assert_eq!(fresh, first);

        let mut played = Board::from_fen(KIWIPETE).expect("FEN should parse");
        let untouched = SearchEngine::default().search(&mut played.clone(), &SearchLimits::depth(3), |_| {});
        SearchEngine::default().search(&mut played, &SearchLimits::depth(3), |_| {});
        let again = SearchEngine::default().search(&mut played, &SearchLimits::depth(3), |_| {});
        assert_eq!(again, untouched);
    }

    #[test]
    fn board_is_restored_after_search() {
        let mut board = Board::from_fen(KIWIPETE).expect("FEN should parse");
        board.make_uci_move("e1g1").expect("castling is legal");
        let fen = board.to_fen();
        let key = board.pos_key;
        let history = board.history_ply();

        let mut engine = SearchEngine::default();
        engine.search(&mut board, &SearchLimits::depth(3), |_| {});

        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.pos_key, key);
        assert_eq!(board.history_ply(), history);
        assert_eq!(board.ply, 0);
        board.check_board().expect("board consistent after search");
    }

    #[test]
    fn reports_every_completed_depth() {
        init_tracing();
        let mut board = Board::from_fen(KIWIPETE).expect("FEN should parse");
        let mut engine = SearchEngine::default();
        let mut reports = Vec::new();
        let outcome = engine.search(&mut board, &SearchLimits::depth(3), |r: &DepthReport| reports.push(r.clone()));

        assert_eq!(reports.iter().map(|r| r.depth).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(reports.windows(2).all(|w| w[0].nodes <= w[1].nodes));
        let last = reports.last().expect("at least one report");
        assert_eq!(last.best_move(), outcome.best_move);
        assert_eq!(last.pv, outcome.pv);
        assert!(!last.pv.is_empty() && last.pv.len() <= 3);
        assert!((0.0..=1.0).contains(&last.fail_high_ratio));
    }

    #[test]
    fn preset_stop_still_returns_a_move() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut board = Board::new();
        let mut engine = SearchEngine::default();
        let limits = SearchLimits::depth(10).with_stop_signal(stop);
        let outcome = engine.search(&mut board, &limits, |_| {});

        assert_eq!(outcome.depth, 0);
        let mv = outcome.best_move.expect("fallback move");
        assert!(MoveGenerator::new().move_exists(&mut board, mv));
        assert!(engine.info().stopped);
    }

    #[test]
    fn deadline_stops_deep_search() {
        let mut board = Board::from_fen(KIWIPETE).expect("FEN should parse");
        let mut engine = SearchEngine::default();
        let limits = SearchLimits::default().with_move_time(Duration::from_millis(100));
        let started = Instant::now();
        let outcome = engine.search(&mut board, &limits, |_| {});

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(outcome.best_move.is_some());
        assert!(outcome.depth < MAX_DEPTH);
        assert_eq!(board.to_fen(), KIWIPETE);
    }

    #[test]
    fn null_move_pruning_keeps_tactics() {
        let config = SearchConfig { null_move_pruning: true, ..SearchConfig::default() };
        let mut engine = SearchEngine::new(config);

        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").expect("FEN should parse");
        let outcome = engine.search(&mut board, &SearchLimits::depth(5), |_| {});
        assert_eq!(outcome.score, MATE - 1);

        let mut board = Board::from_fen(KIWIPETE).expect("FEN should parse");
        let outcome = engine.search(&mut board, &SearchLimits::depth(4), |_| {});
        let mv = outcome.best_move.expect("a move");
        assert!(MoveGenerator::new().move_exists(&mut board, mv));
        assert_eq!(board.to_fen(), KIWIPETE);
    }

    #[test]
    fn repetition_scores_as_draw() {
        // a rook down, white repeats the position instead
        let mut board = Board::from_fen("r5k1/5ppp/8/8/8/8/5PPP/6K1 w - - 0 1").expect("FEN should parse");
        for mv in ["g1f1", "g8f8", "f1g1", "f8g8"] {
            board.make_uci_move(mv).expect("legal shuffle");
        }
        assert!(board.is_repetition());

        let mut engine = SearchEngine::default();
        board.make_uci_move("g1f1").expect("legal");
        board.ply = 1;
        let score = engine.quiescence(&mut board, -INFINITE, INFINITE);
        assert_eq!(score, 0);
    }
}
