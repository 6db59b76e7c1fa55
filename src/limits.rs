//! Search limits and time control
//!
//! A search runs until the target depth completes, the deadline passes or
//! the stop signal is raised, whichever comes first. The deadline is fixed
//! when the search starts.

use crate::types::MAX_DEPTH;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What bounds one call to `SearchEngine::search`
#[derive(Clone, Debug)]
pub struct SearchLimits {
    pub depth: usize,
    pub move_time: Option<Duration>,
    pub stop: Option<Arc<AtomicBool>>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            depth: MAX_DEPTH,
            move_time: None,
            stop: None,
        }
    }
}

impl SearchLimits {
    /// Fixed depth, no clock
    pub fn depth(depth: usize) -> Self {
        Self {
            depth: depth.clamp(1, MAX_DEPTH),
            ..Self::default()
        }
    }

    pub fn with_move_time(mut self, move_time: Duration) -> Self {
        self.move_time = Some(move_time);
        self
    }

    /// Share a flag another thread can set to stop the search
    pub fn with_stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn deadline(&self, start: Instant) -> Option<Instant> {
        self.move_time.map(|t| start + t)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Clock state as a front-end would receive it
#[derive(Clone, Debug)]
pub struct TimeControl {
    pub time_left: Option<Duration>,
    pub increment: Duration,
    pub moves_to_go: u32,
    /// Exact time for this move; replaces `time_left`
    pub move_time: Option<Duration>,
}

const DEFAULT_MOVES_TO_GO: u32 = 30;
const SAFETY_MARGIN: Duration = Duration::from_millis(50);

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            time_left: None,
            increment: Duration::ZERO,
            moves_to_go: DEFAULT_MOVES_TO_GO,
            move_time: None,
        }
    }
}

impl TimeControl {
    /// Time to spend on this move, or None for no clock
    pub fn budget(&self) -> Option<Duration> {
        let (time, moves) = match (self.move_time, self.time_left) {
            (Some(move_time), _) => (move_time, 1),
            (None, Some(left)) => (left, self.moves_to_go.max(1)),
            (None, None) => return None,
        };

        Some((time / moves).saturating_sub(SAFETY_MARGIN) + self.increment)
    }

    pub fn limits(&self, depth: usize) -> SearchLimits {
        let limits = SearchLimits::depth(depth);
        match self.budget() {
            Some(budget) => limits.with_move_time(budget),
            None => limits,
        }
    }
}
