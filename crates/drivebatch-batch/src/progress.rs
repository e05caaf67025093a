//! Per-item progress reporting with percentage throttling and ETA.
//!
//! Workers call [`ProgressReporter::item_completed`] concurrently. A single
//! mutex guards the completion count and throttle state, and the callback runs
//! while it is held, so callbacks never interleave and `completed` is
//! non-decreasing across calls.

use drivebatch_core::{Error, Stopwatch};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Progress snapshot passed to the callback
#[derive(Debug)]
pub struct ProgressEvent<'a> {
    /// Items finished so far, including this one
    pub completed: usize,
    pub total: usize,
    /// Identifier of the item that just finished
    pub label: &'a str,
    pub success: bool,
    pub error: Option<&'a Error>,
    /// Integer percentage complete
    pub percent: usize,
    pub elapsed: Duration,
    /// Advisory; assumes uniform per-item latency
    pub eta: Duration,
}

/// Caller-supplied progress sink
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent<'_>) + Send + Sync>;

/// Estimated time remaining from the average latency so far
pub fn estimate_eta(elapsed: Duration, completed: usize, total: usize) -> Duration {
    if completed == 0 || completed >= total {
        return Duration::ZERO;
    }
    let remaining = (total - completed) as u32;
    (elapsed / completed as u32) * remaining
}

#[derive(Debug, Default)]
struct ProgressState {
    completed: usize,
    last_percent: usize,
}

/// Progress tracking owned by a single batch run
pub struct ProgressReporter {
    total: usize,
    throttle: bool,
    stopwatch: Stopwatch,
    state: Mutex<ProgressState>,
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(total: usize, callback: Option<ProgressCallback>, throttle: bool) -> Self {
        Self {
            total,
            throttle,
            stopwatch: Stopwatch::start(),
            state: Mutex::new(ProgressState::default()),
            callback,
        }
    }

    /// Record one finished item and notify the callback unless throttled.
    ///
    /// With throttling on, the callback fires on the first item, the last
    /// item, and whenever the integer percentage changes.
    pub fn item_completed(&self, label: &str, error: Option<&Error>) {
        let mut state = self.state.lock();
        state.completed += 1;

        let completed = state.completed;
        let percent = if self.total == 0 {
            100
        } else {
            completed * 100 / self.total
        };

        let emit = !self.throttle
            || completed == 1
            || completed == self.total
            || percent != state.last_percent;
        if !emit {
            return;
        }
        state.last_percent = percent;

        if let Some(callback) = &self.callback {
            let elapsed = self.stopwatch.elapsed();
            callback(&ProgressEvent {
                completed,
                total: self.total,
                label,
                success: error.is_none(),
                error,
                percent,
                elapsed,
                eta: estimate_eta(elapsed, completed, self.total),
            });
        }
    }

    /// Items recorded so far
    pub fn completed(&self) -> usize {
        self.state.lock().completed
    }
}
