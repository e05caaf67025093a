//! Domain models shared by the store, the batch call sites and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata of an item held by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Stable remote identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// MIME type reported by the service
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Parent folder identifiers
    #[serde(default)]
    pub parents: Vec<String>,
    /// Whether anyone with the link can read the item
    #[serde(default)]
    pub public: bool,
    /// Whether the item sits in the trash
    #[serde(default)]
    pub trashed: bool,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

/// Result of downloading one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub id: String,
    /// Name the file was written under (after naming policy + sanitization)
    pub name: String,
    /// Name reported by the remote service
    pub original_name: String,
    pub path: PathBuf,
}
