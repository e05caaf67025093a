//! Command-line arguments

use clap::{Parser, Subcommand};
use drivebatch_tools::OutputFormat;
use std::path::PathBuf;

/// drivebatch - concurrent bulk operations against a file store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file (profile defaults are used when absent)
    #[arg(short, long, env = "DRIVEBATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Configuration profile (development, production, quiet)
    #[arg(short, long, default_value = "production", global = true)]
    pub profile: String,

    /// Store root directory
    #[arg(long, env = "DRIVEBATCH_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Concurrent workers, clamped to 1..=10
    #[arg(short, long, global = true, allow_negative_numbers = true)]
    pub workers: Option<i64>,

    /// Keep processing after an item fails
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub continue_on_error: bool,

    /// Stop at the first failure even if the configuration continues on error
    #[arg(long, global = true, action = clap::ArgAction::SetTrue, conflicts_with = "continue_on_error")]
    pub fail_fast: bool,

    /// Stop dispatching remaining items on the first failure instead of
    /// letting them finish in the background
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub cancel_on_error: bool,

    /// Check preconditions and print the plan without changing anything
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Disable progress lines on stderr
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub no_progress: bool,

    /// Report format (json, human, text)
    #[arg(long, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload local files
    Upload {
        /// Files to upload
        paths: Vec<PathBuf>,

        /// Read more paths from a list file (JSON array, {"files": [...]}, or lines)
        #[arg(long)]
        files_from: Option<PathBuf>,

        /// Parent folder id
        #[arg(long)]
        parent: Option<String>,
    },

    /// Download items by id
    Download {
        ids: Vec<String>,

        /// Read more ids from a list file (JSON array, {"ids": [...]}, or lines)
        #[arg(long)]
        ids_from: Option<PathBuf>,

        /// Directory to write files to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Use the remote name verbatim
        #[arg(long, action = clap::ArgAction::SetTrue)]
        keep_name: bool,

        /// Filename template with {id}, {name} and {index}
        #[arg(long)]
        name_pattern: Option<String>,

        /// Export format to request
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Move items to the trash, or delete them permanently
    Delete {
        ids: Vec<String>,

        #[arg(long)]
        ids_from: Option<PathBuf>,

        /// Skip the trash
        #[arg(long, action = clap::ArgAction::SetTrue)]
        permanent: bool,
    },

    /// Remove public link access
    Unshare {
        ids: Vec<String>,

        #[arg(long)]
        ids_from: Option<PathBuf>,
    },

    /// List items in the store
    Ls {
        /// Only items in this folder
        #[arg(long)]
        parent: Option<String>,
    },
}

impl Command {
    /// Operation name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Command::Upload { .. } => "batch-upload",
            Command::Download { .. } => "batch-download",
            Command::Delete { .. } => "batch-delete",
            Command::Unshare { .. } => "batch-unshare",
            Command::Ls { .. } => "ls",
        }
    }
}
