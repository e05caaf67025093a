//! Command execution: configuration, inputs, batch call, rendering.

use crate::cli::{Cli, Command};
use anyhow::{Context, bail};
use drivebatch_batch::{BatchConfig, BatchOutcome, FailFastMode};
use drivebatch_core::{ClientConfig, ConfigProfile, NamingPolicy, load_file_list, load_id_list};
use drivebatch_store::LocalStore;
use drivebatch_tools::{
    BatchTools, DownloadOptions, OutputFormat, ResponseFormatter, console_progress,
    dry_run_response, report_response,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Rendered result of one command
#[derive(Debug)]
pub struct RunOutput {
    /// Text for stdout
    pub rendered: String,
    /// Whether any item failed or the batch stopped early
    pub failed: bool,
}

/// Build the effective configuration: config file or profile, then flags
pub async fn resolve_config(cli: &Cli) -> drivebatch_core::Result<ClientConfig> {
    let profile: ConfigProfile = cli.profile.parse()?;

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path).await?,
        None => profile.create_config(),
    };

    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if cli.continue_on_error {
        config.continue_on_error = true;
    }
    if cli.fail_fast {
        config.continue_on_error = false;
    }
    if cli.no_progress {
        config.progress = false;
    }

    config.validate()?;
    Ok(config)
}

/// Engine configuration for this invocation
pub fn batch_config(cli: &Cli, config: &ClientConfig) -> BatchConfig {
    let mut builder = BatchConfig::builder()
        .workers(config.workers)
        .continue_on_error(config.continue_on_error)
        .dry_run(cli.dry_run);

    if cli.cancel_on_error {
        builder = builder.fail_fast(FailFastMode::Cancel);
    }
    if config.progress {
        builder = builder.progress(console_progress());
    }
    builder.build()
}

/// Positional inputs followed by entries from the list file
async fn collect_ids(ids: &[String], from: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut all = ids.to_vec();
    if let Some(path) = from {
        all.extend(load_id_list(path).await?);
    }
    Ok(all)
}

async fn collect_paths(paths: &[PathBuf], from: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
    let mut all = paths.to_vec();
    if let Some(path) = from {
        all.extend(load_file_list(path).await?.into_iter().map(PathBuf::from));
    }
    Ok(all)
}

/// Execute the parsed command with an already resolved configuration
#[instrument(skip_all, fields(command = cli.command.name(), dry_run = cli.dry_run))]
pub async fn run(cli: &Cli, config: &ClientConfig) -> anyhow::Result<RunOutput> {
    let store_path = config.expanded_store_path()?;
    let store = Arc::new(
        LocalStore::open(&store_path)
            .await
            .with_context(|| format!("Failed to open store at {}", store_path.display()))?,
    );

    log::info!(
        "drivebatch v{} | store: {} | workers: {} | dry run: {}",
        env!("CARGO_PKG_VERSION"),
        store_path.display(),
        config.workers,
        cli.dry_run
    );

    let tools = BatchTools::with_retry(store, config.retry.clone());
    let batch = batch_config(cli, config);
    let operation = cli.command.name();

    let response = match &cli.command {
        Command::Upload {
            paths,
            files_from,
            parent,
        } => {
            let paths = collect_paths(paths, files_from.as_deref()).await?;
            if paths.is_empty() {
                bail!("No files to upload. Provide file paths as arguments or use --files-from");
            }
            let outcome = tools.batch_upload(paths, parent.as_deref(), batch).await?;
            respond(operation, outcome)
        }
        Command::Download {
            ids,
            ids_from,
            output_dir,
            keep_name,
            name_pattern,
            mime_type,
        } => {
            let ids = collect_ids(ids, ids_from.as_deref()).await?;
            if ids.is_empty() {
                bail!("No file IDs to download. Provide IDs as arguments or use --ids-from");
            }
            let options = DownloadOptions {
                output_dir: output_dir.clone(),
                naming: NamingPolicy::from_options(*keep_name, name_pattern.as_deref()),
                mime_type: mime_type.clone(),
            };
            let outcome = tools
                .batch_download(ids, options, batch)
                .await
                .context("Failed to start download")?;
            respond(operation, outcome)
        }
        Command::Delete {
            ids,
            ids_from,
            permanent,
        } => {
            let ids = collect_ids(ids, ids_from.as_deref()).await?;
            if ids.is_empty() {
                bail!("No file IDs to delete. Provide IDs as arguments or use --ids-from");
            }
            let outcome = tools.batch_delete(ids, *permanent, batch).await?;
            respond(operation, outcome)
        }
        Command::Unshare { ids, ids_from } => {
            let ids = collect_ids(ids, ids_from.as_deref()).await?;
            if ids.is_empty() {
                bail!("No file IDs to unshare. Provide IDs as arguments or use --ids-from");
            }
            let outcome = tools.batch_unshare(ids, batch).await?;
            respond(operation, outcome)
        }
        Command::Ls { parent } => {
            let items = tools.store().list(parent.as_deref()).await?;
            return Ok(RunOutput {
                rendered: render_listing(&items, cli.format),
                failed: false,
            });
        }
    };

    let (mut response, failed) = response;
    let plan = cli
        .dry_run
        .then(|| dry_run_response(&tools.dry_run_summary()));

    let rendered = match (cli.format, plan) {
        (OutputFormat::Json, Some(plan)) => {
            response["plan"] = plan;
            ResponseFormatter::format(&response, OutputFormat::Json)
        }
        (format, Some(plan)) => format!(
            "{}\n{}",
            ResponseFormatter::format(&response, format),
            ResponseFormatter::format_plan(&plan, format)
        ),
        (format, None) => ResponseFormatter::format(&response, format),
    };

    Ok(RunOutput { rendered, failed })
}

fn respond<R: serde::Serialize>(operation: &str, outcome: BatchOutcome<R>) -> (Value, bool) {
    let (report, error) = outcome.into_parts();
    if let Some(err) = &error {
        log::warn!("{} stopped early: {}", operation, err);
    }
    let failed = error.is_some() || report.failed_count > 0;
    (report_response(operation, &report, error.as_ref()), failed)
}

fn render_listing(items: &[drivebatch_core::RemoteFile], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => ResponseFormatter::format(
            &json!({ "operation": "ls", "count": items.len(), "items": items }),
            OutputFormat::Json,
        ),
        OutputFormat::Human | OutputFormat::Text => {
            let mut out = String::new();
            for item in items {
                out.push_str(&format!(
                    "{}  {:>10}  {}{}\n",
                    item.id,
                    item.size,
                    item.name,
                    if item.public { "  (public)" } else { "" }
                ));
            }
            out.push_str(&format!("{} item(s)\n", items.len()));
            out
        }
    }
}
