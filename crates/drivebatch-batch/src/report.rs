//! Batch accounting: per-item failures, successes and the final report.

use drivebatch_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A flattened, serializable failure record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Position of the failed item in the input list
    pub index: usize,
    /// Identifier of the item (remote id or local path)
    pub identifier: String,
    pub message: String,
}

/// Output of one successful item, tagged with its input position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSuccess<R> {
    pub index: usize,
    pub identifier: String,
    pub output: R,
}

/// Result of a batch run.
///
/// Successes and errors are kept in arrival order, which is nondeterministic;
/// `index` is the stable identity of each entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport<R> {
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub successes: Vec<BatchSuccess<R>>,
    pub errors: Vec<BatchError>,
    /// Whether the batch ran in simulation mode
    pub dry_run: bool,
    pub duration_ms: u64,
}

impl<R> BatchReport<R> {
    pub fn new(total_count: usize, dry_run: bool) -> Self {
        Self {
            total_count,
            success_count: 0,
            failed_count: 0,
            successes: Vec::with_capacity(total_count),
            errors: Vec::new(),
            dry_run,
            duration_ms: 0,
        }
    }

    pub fn record_success(&mut self, index: usize, identifier: String, output: R) {
        self.success_count += 1;
        self.successes.push(BatchSuccess {
            index,
            identifier,
            output,
        });
    }

    pub fn record_failure(&mut self, index: usize, identifier: String, error: &Error) {
        self.failed_count += 1;
        self.errors.push(BatchError {
            index,
            identifier,
            message: error.to_string(),
        });
    }

    /// Every item was accounted for
    pub fn is_complete(&self) -> bool {
        self.success_count + self.failed_count == self.total_count
    }

    /// No item failed
    pub fn all_succeeded(&self) -> bool {
        self.failed_count == 0 && self.is_complete()
    }

    /// Outputs in arrival order
    pub fn outputs(&self) -> impl Iterator<Item = &R> {
        self.successes.iter().map(|s| &s.output)
    }

    /// Errors ordered by input position
    pub fn sorted_errors(&self) -> Vec<&BatchError> {
        let mut errors: Vec<_> = self.errors.iter().collect();
        errors.sort_by_key(|e| e.index);
        errors
    }

    /// Successes ordered by input position
    pub fn sorted_successes(&self) -> Vec<&BatchSuccess<R>> {
        let mut successes: Vec<_> = self.successes.iter().collect();
        successes.sort_by_key(|s| s.index);
        successes
    }

    /// Failure recorded for the item at `index`, if any
    pub fn error_at(&self, index: usize) -> Option<&BatchError> {
        self.errors.iter().find(|e| e.index == index)
    }
}

/// Report plus the batch-level error, if one was raised.
///
/// Under fail-fast the error is the first item failure, and the report is
/// valid but incomplete. Under continue-on-error the error is only set when
/// the run was cancelled from outside.
#[derive(Debug)]
pub struct BatchOutcome<R> {
    pub report: BatchReport<R>,
    pub error: Option<Error>,
}

impl<R> BatchOutcome<R> {
    pub fn new(report: BatchReport<R>, error: Option<Error>) -> Self {
        Self { report, error }
    }

    pub fn is_aborted(&self) -> bool {
        self.error.is_some()
    }

    /// Drop the partial report when a batch-level error was raised
    pub fn into_result(self) -> Result<BatchReport<R>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.report),
        }
    }

    pub fn into_parts(self) -> (BatchReport<R>, Option<Error>) {
        (self.report, self.error)
    }
}
