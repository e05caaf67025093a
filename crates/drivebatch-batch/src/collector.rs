//! Single consumer that folds worker results into a [`BatchReport`].

use crate::report::BatchReport;
use drivebatch_core::{Error, Result};

/// Result produced by a worker for one item
#[derive(Debug)]
pub struct WorkResult<R> {
    pub index: usize,
    pub identifier: String,
    pub outcome: Result<R>,
}

/// What the collector does after accepting a result
#[derive(Debug)]
pub enum Collect {
    /// Keep draining
    Continue,
    /// Stop draining; carries the failure that triggered fail-fast
    Stop(Error),
}

/// Accumulates results in arrival order and applies the continue-on-error policy
#[derive(Debug)]
pub struct ResultCollector<R> {
    report: BatchReport<R>,
    continue_on_error: bool,
    received: usize,
}

impl<R> ResultCollector<R> {
    pub fn new(total: usize, continue_on_error: bool, dry_run: bool) -> Self {
        Self {
            report: BatchReport::new(total, dry_run),
            continue_on_error,
            received: 0,
        }
    }

    pub fn accept(&mut self, result: WorkResult<R>) -> Collect {
        self.received += 1;
        match result.outcome {
            Ok(output) => {
                self.report
                    .record_success(result.index, result.identifier, output);
                Collect::Continue
            }
            Err(err) => {
                log::warn!(
                    "Item {} ({}) failed: {}",
                    result.index,
                    result.identifier,
                    err
                );
                self.report
                    .record_failure(result.index, result.identifier, &err);
                if self.continue_on_error {
                    Collect::Continue
                } else {
                    Collect::Stop(err)
                }
            }
        }
    }

    /// All expected results have arrived
    pub fn is_drained(&self) -> bool {
        self.received >= self.report.total_count
    }

    pub fn report(&self) -> &BatchReport<R> {
        &self.report
    }

    pub fn finish(self) -> BatchReport<R> {
        self.report
    }
}
