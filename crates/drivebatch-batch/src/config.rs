//! Batch engine configuration.

use crate::progress::ProgressCallback;
use drivebatch_core::MAX_WORKERS;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// What happens to outstanding work when fail-fast returns early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailFastMode {
    /// Return immediately. Workers keep draining the queue in the background
    /// and their results are discarded.
    #[default]
    Detach,
    /// Signal cancellation, stop dispatching new items, wait for in-flight
    /// items and account for them before returning.
    Cancel,
}

/// Configuration for one batch run
#[derive(Clone)]
pub struct BatchConfig {
    /// Requested worker count; see [`BatchConfig::effective_workers`]
    pub workers: i64,
    pub continue_on_error: bool,
    /// Tags the report and log lines; call sites swap in a simulating operation
    pub dry_run: bool,
    pub fail_fast: FailFastMode,
    pub progress: Option<ProgressCallback>,
    /// Limit progress callbacks to one per percentage point
    pub throttle_progress: bool,
    /// Caller-owned cancellation, e.g. for a deadline
    pub cancel: Option<CancellationToken>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            continue_on_error: false,
            dry_run: false,
            fail_fast: FailFastMode::Detach,
            progress: None,
            throttle_progress: true,
            cancel: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("workers", &self.workers)
            .field("continue_on_error", &self.continue_on_error)
            .field("dry_run", &self.dry_run)
            .field("fail_fast", &self.fail_fast)
            .field("progress", &self.progress.is_some())
            .field("throttle_progress", &self.throttle_progress)
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }

    /// Worker count clamped to `[1, MAX_WORKERS]`.
    ///
    /// The cap bounds outbound connection fan-out against the remote service.
    pub fn effective_workers(&self) -> usize {
        self.workers.clamp(1, MAX_WORKERS as i64) as usize
    }
}

/// Builder for BatchConfig
#[derive(Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn workers(mut self, workers: i64) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.config.continue_on_error = continue_on_error;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn fail_fast(mut self, mode: FailFastMode) -> Self {
        self.config.fail_fast = mode;
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    pub fn throttle_progress(mut self, throttle: bool) -> Self {
        self.config.throttle_progress = throttle;
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.config.cancel = Some(token);
        self
    }

    pub fn build(self) -> BatchConfig {
        self.config
    }
}
