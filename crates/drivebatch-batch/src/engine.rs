//! Worker pool and dispatch.

use crate::collector::{Collect, ResultCollector, WorkResult};
use crate::config::{BatchConfig, FailFastMode};
use crate::progress::ProgressReporter;
use crate::queue::{BatchPayload, WorkQueue};
use crate::report::{BatchOutcome, BatchReport};
use drivebatch_core::{Error, Result, Stopwatch};
use parking_lot::Mutex;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Per-item execution context handed to the operation
#[derive(Debug, Clone)]
pub struct ItemContext {
    /// Position of the item in the input list
    pub index: usize,
    pub total: usize,
    /// Tripped when the batch is cancelled; long operations should watch it
    pub cancel: CancellationToken,
    label: Arc<Mutex<Option<String>>>,
}

impl ItemContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Show `label` instead of the payload identifier in progress output.
    /// Reports still use the identifier.
    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.lock() = Some(label.into());
    }
}

/// Runs one operation over many payloads with bounded concurrency
#[derive(Debug, Clone, Default)]
pub struct BatchEngine {
    config: BatchConfig,
}

impl BatchEngine {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `operation` over every payload.
    ///
    /// Each payload is handed to exactly one worker together with its
    /// [`ItemContext`]. Item failures are recorded in the report; under
    /// fail-fast the first failure is also returned as the outcome's error.
    #[instrument(skip_all, name = "batch_run", fields(total = payloads.len(), dry_run = self.config.dry_run))]
    pub async fn run<T, R, F, Fut>(&self, payloads: Vec<T>, operation: F) -> BatchOutcome<R>
    where
        T: BatchPayload,
        R: Send + 'static,
        F: Fn(ItemContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let total = payloads.len();
        if total == 0 {
            return BatchOutcome::new(BatchReport::new(0, self.config.dry_run), None);
        }

        let stopwatch = Stopwatch::start();
        let workers = self.config.effective_workers();
        let cancel = match &self.config.cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        log::info!(
            "Starting batch: {} items, {} workers{}",
            total,
            workers,
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let queue = Arc::new(WorkQueue::from_payloads(payloads));
        let progress = Arc::new(ProgressReporter::new(
            total,
            self.config.progress.clone(),
            self.config.throttle_progress,
        ));
        let operation = Arc::new(operation);

        // Capacity covers every item, so workers never block on send even
        // after the collector has stopped listening.
        let (tx, mut rx) = mpsc::channel::<WorkResult<R>>(total);

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    queue.clone(),
                    operation.clone(),
                    progress.clone(),
                    tx.clone(),
                    cancel.clone(),
                ))
            })
            .collect();
        drop(tx);

        let mut collector = ResultCollector::new(
            total,
            self.config.continue_on_error,
            self.config.dry_run,
        );
        let mut batch_error = None;

        while let Some(result) = rx.recv().await {
            if let Collect::Stop(err) = collector.accept(result) {
                batch_error = Some(err);
                break;
            }
            if collector.is_drained() {
                break;
            }
        }

        if batch_error.is_some() {
            match self.config.fail_fast {
                FailFastMode::Detach => {
                    log::warn!(
                        "Stopping after first failure; {} item(s) still queued or in flight are not reported",
                        total - collector.report().success_count - collector.report().failed_count
                    );
                }
                FailFastMode::Cancel => {
                    log::warn!("Stopping after first failure; cancelling remaining work");
                    cancel.cancel();
                    for handle in handles {
                        if let Err(e) = handle.await {
                            log::error!("Batch worker terminated abnormally: {}", e);
                        }
                    }
                    while let Ok(result) = rx.try_recv() {
                        // Failures here are recorded; the batch error stays the first one.
                        let _ = collector.accept(result);
                    }
                }
            }
        } else if !collector.is_drained() {
            let reported = collector.report().success_count + collector.report().failed_count;
            batch_error = Some(if cancel.is_cancelled() {
                Error::cancelled(format!("batch stopped after {} of {} items", reported, total))
            } else {
                log::error!("Workers exited with {} of {} items reported", reported, total);
                Error::other(format!(
                    "batch workers terminated abnormally after {} of {} items",
                    reported, total
                ))
            });
        }

        let mut report = collector.finish();
        report.duration_ms = stopwatch.elapsed_ms();

        log::info!(
            "Batch finished: {} succeeded, {} failed, {} total in {}ms",
            report.success_count,
            report.failed_count,
            report.total_count,
            report.duration_ms
        );

        BatchOutcome::new(report, batch_error)
    }
}

async fn worker_loop<T, R, F, Fut>(
    worker_id: usize,
    queue: Arc<WorkQueue<T>>,
    operation: Arc<F>,
    progress: Arc<ProgressReporter>,
    results: mpsc::Sender<WorkResult<R>>,
    cancel: CancellationToken,
) where
    T: BatchPayload,
    R: Send + 'static,
    F: Fn(ItemContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let total = queue.total();

    loop {
        if cancel.is_cancelled() {
            log::debug!("Worker {} observed cancellation", worker_id);
            break;
        }
        let Some(item) = queue.pop() else {
            break;
        };

        let identifier = item.payload.identifier();
        let ctx = ItemContext {
            index: item.index,
            total,
            cancel: cancel.clone(),
            label: Arc::new(Mutex::new(None)),
        };
        let label = ctx.label.clone();

        // The operation is called inside the task so a panic in either its
        // synchronous part or its future becomes an item failure.
        let op = operation.clone();
        let payload = item.payload;
        let outcome = match tokio::spawn(async move { (*op)(ctx, payload).await }).await {
            Ok(outcome) => outcome,
            Err(e) => Err(Error::other(format!("operation for {} panicked: {}", identifier, e))),
        };

        let shown = label.lock().take().unwrap_or_else(|| identifier.clone());
        let reported = panic::catch_unwind(AssertUnwindSafe(|| {
            progress.item_completed(&shown, outcome.as_ref().err())
        }));
        if reported.is_err() {
            log::error!("Progress callback panicked for {}", identifier);
        }

        // The collector may already have returned; the result is then dropped.
        let _ = results
            .send(WorkResult {
                index: item.index,
                identifier,
                outcome,
            })
            .await;
    }
}
