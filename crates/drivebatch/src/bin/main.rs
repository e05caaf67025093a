//! drivebatch CLI

use anyhow::Context;
use clap::Parser;
use drivebatch::{Cli, resolve_config, run};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, json: bool) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)
        .await
        .context("Failed to resolve configuration")?;
    init_logging(&config.log_level, cli.json_logs);

    log::debug!("Profile: {} | Config: {:?}", cli.profile, config);

    let output = run(&cli, &config).await?;
    println!("{}", output.rendered.trim_end());

    Ok(if output.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
