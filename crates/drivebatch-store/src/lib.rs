//! Remote store interface and implementations.
//!
//! [`RemoteStore`] is the per-item remote API the batch call sites drive. Every
//! method is a single request that may fail or be slow; implementations must
//! be safe to call concurrently for different items.
//!
//! [`LocalStore`] keeps items in a directory (blobs plus a JSON index) and
//! behaves like the remote service for the CLI and for tests.

pub mod atomic;
pub mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use drivebatch_core::{RemoteFile, Result};
use std::path::Path;

/// Identifier of the "anyone with the link" permission
pub const PUBLIC_PERMISSION_ID: &str = "anyoneWithLink";

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch item metadata
    async fn get(&self, id: &str) -> Result<RemoteFile>;

    /// List items, optionally restricted to one parent folder. Trashed items
    /// are skipped.
    async fn list(&self, parent_id: Option<&str>) -> Result<Vec<RemoteFile>>;

    /// Upload a local file and return the created item
    async fn upload(&self, local_path: &Path, parent_id: Option<&str>) -> Result<RemoteFile>;

    /// Download an item to `dest`, optionally exported as `mime_type`.
    /// Returns the number of bytes written.
    async fn download(&self, id: &str, dest: &Path, mime_type: Option<&str>) -> Result<u64>;

    /// Move an item to the trash
    async fn trash(&self, id: &str) -> Result<()>;

    /// Delete an item permanently
    async fn delete(&self, id: &str) -> Result<()>;

    /// Remove the "anyone with the link" permission and return the updated item
    async fn remove_public_access(&self, id: &str) -> Result<RemoteFile>;
}
