//! # Batch Engine
//!
//! Runs one fallible, possibly slow operation over many independent items with
//! a bounded worker pool, and accounts for every success and failure.
//!
//! - [`queue`] - pre-filled work queue; each item is delivered exactly once
//! - [`engine`] - worker pool, dispatch and the fail-fast policy
//! - [`collector`] - single consumer folding results into a report
//! - [`progress`] - throttled progress callback with ETA
//! - [`report`] - `BatchReport`, `BatchError`, `BatchOutcome`
//!
//! ```no_run
//! use drivebatch_batch::{BatchConfig, BatchEngine};
//! use drivebatch_core::Error;
//!
//! # async fn demo() {
//! let engine = BatchEngine::new(BatchConfig::builder().workers(4).continue_on_error(true).build());
//! let ids = vec!["a".to_string(), "b".to_string()];
//! let outcome = engine
//!     .run(ids, |_ctx, id: String| async move { Ok::<_, Error>(id.len()) })
//!     .await;
//! assert_eq!(outcome.report.success_count, 2);
//! # }
//! ```
//!
//! Results arrive in completion order. The `index` carried by every success
//! and error is the only stable identity.

pub mod collector;
pub mod config;
pub mod engine;
pub mod progress;
pub mod queue;
pub mod report;

pub use collector::{Collect, ResultCollector, WorkResult};
pub use config::{BatchConfig, BatchConfigBuilder, FailFastMode};
pub use engine::{BatchEngine, ItemContext};
pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter, estimate_eta};
pub use queue::{BatchPayload, WorkItem, WorkQueue};
pub use report::{BatchError, BatchOutcome, BatchReport, BatchSuccess};
pub use tokio_util::sync::CancellationToken;
