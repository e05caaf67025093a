//! Directory-backed store.
//!
//! Layout:
//! ```text
//! <root>/index.json     id -> RemoteFile
//! <root>/blobs/<id>     item content
//! ```

use crate::atomic::{copy_atomic, write_atomic};
use crate::{PUBLIC_PERMISSION_ID, RemoteStore};
use async_trait::async_trait;
use chrono::Utc;
use drivebatch_core::{Error, RemoteFile, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::instrument;

const INDEX_FILE: &str = "index.json";
const BLOB_DIR: &str = "blobs";

/// Store whose items live in a local directory
pub struct LocalStore {
    root: PathBuf,
    index: RwLock<BTreeMap<String, RemoteFile>>,
}

impl LocalStore {
    /// Open the store at `root`, creating it if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(BLOB_DIR))
            .await
            .map_err(Error::io)?;

        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content = fs::read_to_string(&index_path).await.map_err(Error::io)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::parse_error(format!(
                    "Corrupt store index {}: {}",
                    index_path.display(),
                    e
                ))
            })?
        } else {
            BTreeMap::new()
        };

        log::debug!(
            "Opened store at {} ({} items)",
            root.display(),
            index.len()
        );

        Ok(Self {
            root,
            index: RwLock::new(index),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.root.join(BLOB_DIR).join(id)
    }

    async fn persist(&self, index: &BTreeMap<String, RemoteFile>) -> Result<()> {
        let json = serde_json::to_vec_pretty(index)
            .map_err(|e| Error::other(format!("Failed to serialize store index: {}", e)))?;
        write_atomic(&self.root.join(INDEX_FILE), &json).await
    }

    /// Apply `change` to a copy of the index, persist the copy, then swap it in.
    ///
    /// The in-memory index only changes once `index.json` has been written.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, RemoteFile>) -> Result<T>,
    ) -> Result<T> {
        let mut index = self.index.write().await;
        let mut staged = index.clone();
        let value = change(&mut staged)?;
        self.persist(&staged).await?;
        *index = staged;
        Ok(value)
    }

    /// Grant or revoke public link access
    pub async fn set_public(&self, id: &str, public: bool) -> Result<RemoteFile> {
        self.commit(|index| {
            let file = index.get_mut(id).ok_or_else(|| Error::not_found(id))?;
            file.public = public;
            file.modified_at = Utc::now();
            Ok(file.clone())
        })
        .await
    }

    /// Number of items, trashed ones included
    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }
}

#[async_trait]
impl RemoteStore for LocalStore {
    async fn get(&self, id: &str) -> Result<RemoteFile> {
        self.index
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    async fn list(&self, parent_id: Option<&str>) -> Result<Vec<RemoteFile>> {
        let index = self.index.read().await;
        Ok(index
            .values()
            .filter(|f| !f.trashed)
            .filter(|f| parent_id.is_none_or(|p| f.parents.iter().any(|x| x == p)))
            .cloned()
            .collect())
    }

    #[instrument(skip(self), fields(path = %local_path.display()), name = "store_upload")]
    async fn upload(&self, local_path: &Path, parent_id: Option<&str>) -> Result<RemoteFile> {
        let metadata = fs::metadata(local_path)
            .await
            .map_err(|_| Error::file_not_found(local_path))?;
        if !metadata.is_file() {
            return Err(Error::invalid_argument(format!(
                "Not a regular file: {}",
                local_path.display()
            )));
        }

        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::invalid_argument(format!("No file name in {}", local_path.display()))
            })?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let size = copy_atomic(local_path, &self.blob_path(&id)).await?;

        let file = RemoteFile {
            id: id.clone(),
            name,
            mime_type: mime_guess::from_path(local_path)
                .first_or_octet_stream()
                .to_string(),
            size,
            parents: parent_id.map(|p| vec![p.to_string()]).unwrap_or_default(),
            public: false,
            trashed: false,
            modified_at: Utc::now(),
        };

        let staged = file.clone();
        if let Err(e) = self
            .commit(move |index| {
                index.insert(id, staged);
                Ok(())
            })
            .await
        {
            let _ = fs::remove_file(self.blob_path(&file.id)).await;
            return Err(e);
        }

        log::debug!("Uploaded {} as {}", local_path.display(), file.id);
        Ok(file)
    }

    #[instrument(skip(self), fields(dest = %dest.display()), name = "store_download")]
    async fn download(&self, id: &str, dest: &Path, mime_type: Option<&str>) -> Result<u64> {
        let file = self.get(id).await?;

        if let Some(requested) = mime_type
            && requested != file.mime_type
        {
            return Err(Error::invalid_argument(format!(
                "Cannot export {} ({}) as {}",
                file.name, file.mime_type, requested
            )));
        }

        copy_atomic(&self.blob_path(id), dest).await
    }

    async fn trash(&self, id: &str) -> Result<()> {
        self.commit(|index| {
            let file = index.get_mut(id).ok_or_else(|| Error::not_found(id))?;
            file.trashed = true;
            file.modified_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.commit(|index| match index.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(id)),
        })
        .await?;

        if let Err(e) = fs::remove_file(self.blob_path(id)).await {
            log::warn!("Deleted {} but could not remove its blob: {}", id, e);
        }
        Ok(())
    }

    async fn remove_public_access(&self, id: &str) -> Result<RemoteFile> {
        self.commit(|index| {
            let file = index.get_mut(id).ok_or_else(|| Error::not_found(id))?;
            if !file.public {
                return Err(Error::not_found(format!(
                    "{}/permissions/{}",
                    id, PUBLIC_PERMISSION_ID
                )));
            }
            file.public = false;
            file.modified_at = Utc::now();
            Ok(file.clone())
        })
        .await
    }
}
