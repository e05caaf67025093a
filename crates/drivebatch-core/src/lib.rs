//! # drivebatch Core
//!
//! Core types, error handling and configuration shared by every drivebatch crate.
//!
//! ## Core Modules
//!
//! - [`error`] - Error enum and Result alias
//! - [`config`] - Client configuration loaded from YAML
//! - [`profiles`] - Preset configurations
//! - [`models`] - Remote item metadata and download records
//! - [`resilience`] - Retry with exponential backoff for remote requests
//! - [`dry_run`] - Recording planned mutations instead of performing them
//! - [`lists`] - File/ID list ingestion (JSON array, JSON object, text lines)
//! - [`naming`] - Download path resolution and filename sanitization
//! - [`utils`] - JSON helpers, duration formatting, timing
//!
//! ## Error Handling
//!
//! ```
//! use drivebatch_core::prelude::*;
//!
//! fn check(id: &str) -> Result<()> {
//!     if id.is_empty() {
//!         return Err(Error::invalid_argument("file id is required"));
//!     }
//!     Ok(())
//! }
//! assert!(check("").is_err());
//! ```
//!
//! ## Dry Run
//!
//! ```
//! use drivebatch_core::dry_run::{self, DryRunRecorder, MemoryRecorder};
//!
//! let recorder = MemoryRecorder::new();
//! dry_run::record_delete(&recorder, "1a2b", "old.txt", false);
//! assert_eq!(recorder.count(), 1);
//! ```

pub mod config;
pub mod dry_run;
pub mod error;
pub mod lists;
pub mod models;
pub mod naming;
pub mod profiles;
pub mod resilience;
pub mod utils;

pub use config::{ClientConfig, DEFAULT_WORKERS, MAX_WORKERS};
pub use dry_run::{DryRunRecorder, DryRunSummary, MemoryRecorder, OperationKind, PlannedOperation};
pub use error::{Error, Result};
pub use lists::{ListField, load_file_list, load_id_list, parse_list};
pub use models::{DownloadedFile, RemoteFile};
pub use naming::{NamingPolicy, resolve_output_path, sanitize_filename};
pub use profiles::ConfigProfile;
pub use resilience::{RetryConfig, retry_with_backoff};
pub use utils::{Stopwatch, format_duration, to_json_string};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::dry_run::{DryRunRecorder, MemoryRecorder, OperationKind, PlannedOperation};
    pub use crate::error::{Error, Result};
    pub use crate::models::{DownloadedFile, RemoteFile};
    pub use crate::naming::NamingPolicy;
    pub use crate::profiles::ConfigProfile;
    pub use crate::resilience::RetryConfig;
}
