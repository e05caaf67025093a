//! Batch call sites: upload, download, delete and unshare over many items.
//!
//! Each call site validates its arguments, then hands the engine one of two
//! closures: the real operation (store calls wrapped in retry) or, when the
//! batch is a dry run, a simulation that checks the item's precondition and
//! records the planned change.

use chrono::Utc;
use drivebatch_batch::{BatchConfig, BatchEngine, BatchOutcome, ItemContext};
use drivebatch_core::dry_run;
use drivebatch_core::prelude::*;
use drivebatch_core::{DryRunSummary, NamingPolicy, resolve_output_path, retry_with_backoff};
use drivebatch_store::{PUBLIC_PERMISSION_ID, RemoteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// Download settings shared by every item of a batch
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Directory files are written to; created before the batch starts
    pub output_dir: Option<PathBuf>,
    pub naming: NamingPolicy,
    /// Export format requested from the store
    pub mime_type: Option<String>,
}

/// Batch operations against a remote store
pub struct BatchTools {
    store: Arc<dyn RemoteStore>,
    retry: RetryConfig,
    recorder: Arc<MemoryRecorder>,
}

impl BatchTools {
    /// Create batch tools with the default retry policy
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_retry(store, RetryConfig::default())
    }

    pub fn with_retry(store: Arc<dyn RemoteStore>, retry: RetryConfig) -> Self {
        Self {
            store,
            retry,
            recorder: Arc::new(MemoryRecorder::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Planned operations recorded by dry-run batches
    pub fn recorder(&self) -> &Arc<MemoryRecorder> {
        &self.recorder
    }

    pub fn dry_run_summary(&self) -> DryRunSummary {
        self.recorder.summary()
    }

    /// Upload local files, optionally into `parent_id`.
    ///
    /// Dry run checks that each path is a readable regular file, records the
    /// upload and yields a preview item with an empty id.
    #[instrument(skip_all, name = "batch_upload", fields(count = paths.len()))]
    pub async fn batch_upload(
        &self,
        paths: Vec<PathBuf>,
        parent_id: Option<&str>,
        config: BatchConfig,
    ) -> Result<BatchOutcome<RemoteFile>> {
        if parent_id.is_some_and(str::is_empty) {
            return Err(Error::invalid_argument("parent id must not be empty"));
        }
        let parent = parent_id.map(str::to_string);
        let engine = BatchEngine::new(config);

        if engine.config().dry_run {
            let recorder = self.recorder.clone();
            return Ok(engine
                .run(paths, move |_ctx: ItemContext, path: PathBuf| {
                    let recorder = recorder.clone();
                    let parent = parent.clone();
                    async move {
                        let metadata = tokio::fs::metadata(&path)
                            .await
                            .map_err(|_| Error::file_not_found(&path))?;
                        if !metadata.is_file() {
                            return Err(Error::invalid_argument(format!(
                                "Not a regular file: {}",
                                path.display()
                            )));
                        }

                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        dry_run::record_upload(
                            &*recorder,
                            &path.display().to_string(),
                            &name,
                        );

                        Ok(RemoteFile {
                            id: String::new(),
                            mime_type: mime_guess::from_path(&path)
                                .first_or_octet_stream()
                                .to_string(),
                            name,
                            size: metadata.len(),
                            parents: parent.into_iter().collect(),
                            public: false,
                            trashed: false,
                            modified_at: Utc::now(),
                        })
                    }
                })
                .await);
        }

        let store = self.store.clone();
        let retry = self.retry.clone();
        Ok(engine
            .run(paths, move |_ctx: ItemContext, path: PathBuf| {
                let store = store.clone();
                let retry = retry.clone();
                let parent = parent.clone();
                async move {
                    retry_with_backoff(&retry, || store.upload(&path, parent.as_deref())).await
                }
            })
            .await)
    }

    /// Download items by id.
    ///
    /// The output directory is created before any item is processed; failing
    /// to create it fails the whole call. Dry run resolves metadata and the
    /// local path without writing anything.
    #[instrument(skip_all, name = "batch_download", fields(count = ids.len()))]
    pub async fn batch_download(
        &self,
        ids: Vec<String>,
        options: DownloadOptions,
        config: BatchConfig,
    ) -> Result<BatchOutcome<DownloadedFile>> {
        if options.mime_type.as_deref().is_some_and(str::is_empty) {
            return Err(Error::invalid_argument("mime type must not be empty"));
        }
        if let NamingPolicy::Pattern(pattern) = &options.naming
            && pattern.is_empty()
        {
            return Err(Error::invalid_argument("name pattern must not be empty"));
        }

        if let Some(dir) = &options.output_dir
            && !dir.as_os_str().is_empty()
            && !ids.is_empty()
            && !config.dry_run
        {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                log::error!("Failed to create output directory {}: {}", dir.display(), e);
                Error::io(e)
            })?;
        }

        let engine = BatchEngine::new(config);
        let dry = engine.config().dry_run;
        let store = self.store.clone();
        let retry = self.retry.clone();
        let options = Arc::new(options);

        Ok(engine
            .run(ids, move |ctx: ItemContext, id: String| {
                let store = store.clone();
                let retry = retry.clone();
                let options = options.clone();
                async move {
                    let file = retry_with_backoff(&retry, || store.get(&id)).await?;
                    ctx.set_label(&file.name);
                    let path = resolve_output_path(
                        &file,
                        ctx.index,
                        options.output_dir.as_deref(),
                        &options.naming,
                    );

                    if !dry {
                        if ctx.is_cancelled() {
                            return Err(Error::cancelled(format!("download of {} skipped", id)));
                        }
                        let mime_type = options.mime_type.as_deref();
                        retry_with_backoff(&retry, || store.download(&id, &path, mime_type))
                            .await?;
                    }

                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    Ok(DownloadedFile {
                        id,
                        name,
                        original_name: file.name,
                        path,
                    })
                }
            })
            .await)
    }

    /// Trash items, or delete them permanently. Successful items yield their id.
    #[instrument(skip_all, name = "batch_delete", fields(count = ids.len(), permanent = permanent))]
    pub async fn batch_delete(
        &self,
        ids: Vec<String>,
        permanent: bool,
        config: BatchConfig,
    ) -> Result<BatchOutcome<String>> {
        let engine = BatchEngine::new(config);
        let store = self.store.clone();
        let retry = self.retry.clone();

        if engine.config().dry_run {
            let recorder = self.recorder.clone();
            return Ok(engine
                .run(ids, move |_ctx: ItemContext, id: String| {
                    let store = store.clone();
                    let retry = retry.clone();
                    let recorder = recorder.clone();
                    async move {
                        let file = retry_with_backoff(&retry, || store.get(&id)).await?;
                        dry_run::record_delete(&*recorder, &id, &file.name, permanent);
                        Ok(id)
                    }
                })
                .await);
        }

        Ok(engine
            .run(ids, move |_ctx: ItemContext, id: String| {
                let store = store.clone();
                let retry = retry.clone();
                async move {
                    if permanent {
                        retry_with_backoff(&retry, || store.delete(&id)).await?;
                    } else {
                        retry_with_backoff(&retry, || store.trash(&id)).await?;
                    }
                    Ok(id)
                }
            })
            .await)
    }

    /// Remove public link access from items.
    ///
    /// An item that is not currently public fails, in dry run as well.
    #[instrument(skip_all, name = "batch_unshare", fields(count = ids.len()))]
    pub async fn batch_unshare(
        &self,
        ids: Vec<String>,
        config: BatchConfig,
    ) -> Result<BatchOutcome<RemoteFile>> {
        let engine = BatchEngine::new(config);
        let store = self.store.clone();
        let retry = self.retry.clone();

        if engine.config().dry_run {
            let recorder = self.recorder.clone();
            return Ok(engine
                .run(ids, move |_ctx: ItemContext, id: String| {
                    let store = store.clone();
                    let retry = retry.clone();
                    let recorder = recorder.clone();
                    async move {
                        let mut file = retry_with_backoff(&retry, || store.get(&id)).await?;
                        if !file.public {
                            return Err(Error::not_found(format!(
                                "{}/permissions/{}",
                                id, PUBLIC_PERMISSION_ID
                            )));
                        }
                        dry_run::record_permission_delete(
                            &*recorder,
                            &id,
                            &file.name,
                            PUBLIC_PERMISSION_ID,
                        );
                        file.public = false;
                        Ok(file)
                    }
                })
                .await);
        }

        Ok(engine
            .run(ids, move |_ctx: ItemContext, id: String| {
                let store = store.clone();
                let retry = retry.clone();
                async move { retry_with_backoff(&retry, || store.remove_public_access(&id)).await }
            })
            .await)
    }
}
