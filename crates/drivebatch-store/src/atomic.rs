//! Write-then-rename helpers.
//!
//! Readers never observe a partially written file: content goes to a sibling
//! temp file first and is renamed over the destination.

use drivebatch_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

/// Atomically replace `path` with `content`
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content).await.map_err(Error::io)?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::io(e));
    }
    Ok(())
}

/// Atomically copy `from` to `to`, returning the number of bytes copied
pub async fn copy_atomic(from: &Path, to: &Path) -> Result<u64> {
    let temp_path = temp_path_for(to);
    let bytes = fs::copy(from, &temp_path).await.map_err(Error::io)?;

    if let Err(e) = fs::rename(&temp_path, to).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::io(e));
    }
    Ok(bytes)
}
