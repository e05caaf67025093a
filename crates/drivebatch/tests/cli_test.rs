//! End-to-end command runs against a temporary store

use clap::Parser;
use drivebatch::{Cli, resolve_config, run};
use drivebatch_batch::FailFastMode;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn parse(store: &Path, args: &[&str]) -> Cli {
    let store = store.display().to_string();
    let mut argv = vec![
        "drivebatch",
        "--store",
        store.as_str(),
        "--no-progress",
        "--format",
        "json",
    ];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid arguments")
}

async fn exec(store: &Path, args: &[&str]) -> (Value, bool) {
    let cli = parse(store, args);
    let config = resolve_config(&cli).await.unwrap();
    let output = run(&cli, &config).await.unwrap();
    (serde_json::from_str(&output.rendered).unwrap(), output.failed)
}

async fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    for name in ["one.txt", "two.txt"] {
        tokio::fs::write(temp.path().join(name), name).await.unwrap();
    }
    temp
}

#[tokio::test]
async fn test_upload_ls_delete_roundtrip() {
    let temp = fixture().await;
    let store = temp.path().join("store");
    let one = temp.path().join("one.txt").display().to_string();
    let two = temp.path().join("two.txt").display().to_string();

    let (uploaded, failed) = exec(&store, &["upload", &one, &two, "--workers", "2"]).await;
    assert!(!failed);
    assert_eq!(uploaded["summary"]["success"], 2);

    let (listing, _) = exec(&store, &["ls"]).await;
    assert_eq!(listing["count"], 2);
    let ids: Vec<String> = listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect();

    let (deleted, failed) = exec(&store, &["delete", "--permanent", &ids[0], &ids[1]]).await;
    assert!(!failed);
    assert_eq!(deleted["summary"]["success"], 2);

    let (listing, _) = exec(&store, &["ls"]).await;
    assert_eq!(listing["count"], 0);
}

#[tokio::test]
async fn test_dry_run_delete_includes_plan() {
    let temp = fixture().await;
    let store = temp.path().join("store");
    let one = temp.path().join("one.txt").display().to_string();
    let (uploaded, _) = exec(&store, &["upload", &one]).await;
    let id = uploaded["items"][0]["output"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (response, failed) = exec(&store, &["--dry-run", "delete", &id]).await;
    assert!(!failed);
    assert_eq!(response["dry_run"], true);
    assert_eq!(response["plan"]["total"], 1);
    assert_eq!(response["plan"]["by_kind"]["trash"], 1);

    let (listing, _) = exec(&store, &["ls"]).await;
    assert_eq!(listing["count"], 1);
}

#[tokio::test]
async fn test_ids_from_list_file_and_failures_set_exit_status() {
    let temp = fixture().await;
    let store = temp.path().join("store");
    let list = temp.path().join("ids.txt");
    tokio::fs::write(&list, "# ids to remove\nmissing-1\n\nmissing-2\n")
        .await
        .unwrap();
    let list = list.display().to_string();

    let (response, failed) = exec(
        &store,
        &["--continue-on-error", "delete", "--ids-from", &list],
    )
    .await;

    assert!(failed);
    assert_eq!(response["summary"]["total"], 2);
    assert_eq!(response["summary"]["failed"], 2);
    assert_eq!(response["errors"][0]["identifier"], "missing-1");
    assert!(response["aborted"].is_null());
}

#[tokio::test]
async fn test_no_inputs_is_an_error() {
    let temp = fixture().await;
    let cli = parse(&temp.path().join("store"), &["unshare"]);
    let config = resolve_config(&cli).await.unwrap();

    let err = run(&cli, &config).await.unwrap_err();
    assert!(err.to_string().contains("No file IDs to unshare"));
}

#[tokio::test]
async fn test_flags_override_profile() {
    let temp = fixture().await;
    let cli = parse(
        &temp.path().join("store"),
        &[
            "--profile",
            "quiet",
            "--workers",
            "-3",
            "--cancel-on-error",
            "ls",
        ],
    );
    let config = resolve_config(&cli).await.unwrap();

    assert_eq!(config.log_level, "warn");
    assert_eq!(config.workers, -3);
    assert!(!config.progress);

    let batch = drivebatch::batch_config(&cli, &config);
    assert_eq!(batch.effective_workers(), 1);
    assert_eq!(batch.fail_fast, FailFastMode::Cancel);
    assert!(batch.progress.is_none());
}

#[tokio::test]
async fn test_unknown_profile_rejected() {
    let temp = fixture().await;
    let cli = parse(&temp.path().join("store"), &["--profile", "turbo", "ls"]);
    assert!(resolve_config(&cli).await.is_err());
}

#[tokio::test]
async fn test_config_file_is_loaded() {
    let temp = fixture().await;
    let config_path = temp.path().join("drivebatch.yaml");
    tokio::fs::write(
        &config_path,
        "workers: 7\ncontinue_on_error: true\nretry:\n  max_attempts: 2\n",
    )
    .await
    .unwrap();
    let config_arg = config_path.display().to_string();

    let cli = parse(&temp.path().join("store"), &["--config", &config_arg, "ls"]);
    let config = resolve_config(&cli).await.unwrap();

    assert_eq!(config.workers, 7);
    assert!(config.continue_on_error);
    assert_eq!(config.retry.max_attempts, 2);
    assert_eq!(config.store_path, temp.path().join("store"));
}

#[tokio::test]
async fn test_fail_fast_overrides_config_file() {
    let temp = fixture().await;
    let config_path = temp.path().join("drivebatch.yaml");
    tokio::fs::write(&config_path, "continue_on_error: true\n")
        .await
        .unwrap();
    let config_arg = config_path.display().to_string();

    let cli = parse(
        &temp.path().join("store"),
        &["--config", &config_arg, "--fail-fast", "ls"],
    );
    let config = resolve_config(&cli).await.unwrap();
    assert!(!config.continue_on_error);

    let conflicting = Cli::try_parse_from([
        "drivebatch",
        "--fail-fast",
        "--continue-on-error",
        "ls",
    ]);
    assert!(conflicting.is_err());
}
