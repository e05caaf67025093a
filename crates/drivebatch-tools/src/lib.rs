//! # Batch Tools
//!
//! The batch operations exposed by drivebatch, built on the generic engine in
//! [`drivebatch_batch`] and a [`drivebatch_store::RemoteStore`].
//!
//! ## Batch call sites
//!
//! [`batch_tools::BatchTools`]:
//! - Upload local files
//! - Download items with a naming policy
//! - Trash or permanently delete items
//! - Remove public link access
//!
//! Every call site supports dry run. In a dry run the per-item operation is
//! swapped for a simulation that checks the item's precondition and records
//! the planned change in [`drivebatch_core::MemoryRecorder`]; the engine
//! itself does not know the difference.
//!
//! ## Output
//!
//! - [`progress_display`] - single-line console progress with ETA
//! - [`output_formatter`] - JSON, human and text rendering of reports and plans
//!
//! ## Example
//!
//! ```no_run
//! use drivebatch_batch::BatchConfig;
//! use drivebatch_store::LocalStore;
//! use drivebatch_tools::BatchTools;
//! use std::sync::Arc;
//!
//! # async fn demo() -> drivebatch_core::Result<()> {
//! let store = Arc::new(LocalStore::open("/tmp/store").await?);
//! let tools = BatchTools::new(store);
//! let outcome = tools
//!     .batch_delete(vec!["1a2b".into()], false, BatchConfig::builder().dry_run(true).build())
//!     .await?;
//! println!("{} planned", tools.dry_run_summary().total_count);
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod batch_tools;
pub mod output_formatter;
pub mod progress_display;

pub use batch_tools::{BatchTools, DownloadOptions};
pub use drivebatch_core::prelude::*;
pub use output_formatter::{OutputFormat, ResponseFormatter, dry_run_response, report_response};
pub use progress_display::{console_progress, format_progress_line};
