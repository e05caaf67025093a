//! # drivebatch
//!
//! Command-line client for bulk upload, download, delete and unshare.
//!
//! The binary parses [`cli::Cli`], resolves a [`drivebatch_core::ClientConfig`]
//! from a config file or profile plus flags, and hands the command to
//! [`app::run`], which drives [`drivebatch_tools::BatchTools`].

pub mod app;
pub mod cli;

pub use app::{RunOutput, batch_config, resolve_config, run};
pub use cli::{Cli, Command};
pub use drivebatch_core::prelude::*;
pub use drivebatch_tools::{BatchTools, OutputFormat};
