//! Command handlers for the CLI
//!
//! Resolves credentials and configuration, runs the download with a progress
//! display attached, and writes the reassembled file.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::app::{write_atomic, ClientConfig, CloudDownloader, ExecutionMode, SchedulerConfig};
use crate::auth::resolve_credentials;
use crate::cli::args::{DownloadArgs, GlobalArgs};
use crate::cli::progress::{ProgressConfig, ProgressDisplay};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle a download run
pub async fn handle_download(
    global: &GlobalArgs,
    args: DownloadArgs,
    config: AppConfig,
) -> Result<()> {
    let start_time = Instant::now();

    args.validate().map_err(AppError::generic)?;
    let index_url = args
        .index_url
        .as_deref()
        .ok_or_else(|| AppError::generic("Missing index URL"))?;
    let credentials = resolve_credentials(args.credentials.as_deref())?;

    let (client_config, scheduler_config) = runtime_config(&args, &config)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    let force = args.force || config.output.force;

    info!(
        "Downloading {} as {} into {} ({} workers, {:?})",
        index_url,
        credentials.username(),
        output_dir.display(),
        scheduler_config.worker_count,
        scheduler_config.mode
    );

    let progress_config = if global.quiet {
        ProgressConfig::hidden()
    } else {
        ProgressConfig::default()
    };
    let (progress_tx, progress_rx) = mpsc::channel(scheduler_config.progress_buffer_size);
    let progress_task = ProgressDisplay::new(progress_config).spawn(progress_rx);

    let downloader = CloudDownloader::new(client_config, scheduler_config).with_progress(progress_tx);
    let result = downloader.download(index_url, &credentials).await;
    // Closes the progress channel so the display can finish
    drop(downloader);

    let summary = progress_task
        .await
        .map_err(|e| AppError::generic(format!("Progress display failed: {}", e)))?;

    let file = result.map_err(|e| {
        error!("Download failed after {:?}: {}", start_time.elapsed(), e);
        e
    })?;
    let path = write_atomic(&output_dir, &file.filename, &file.data, force).await?;

    info!(
        "Completed {} of {} sources in {:?}",
        summary.completed,
        file.sources,
        start_time.elapsed()
    );
    if !global.quiet {
        println!(
            "Saved {} ({} bytes from {} sources)",
            path.display(),
            file.data.len(),
            file.sources
        );
    }

    Ok(())
}

/// Print a commented default configuration file
pub fn handle_print_config() -> Result<()> {
    print!("{}", AppConfig::generate_default_config_content());
    Ok(())
}

/// Merge file configuration with command-line overrides and validate
pub fn runtime_config(
    args: &DownloadArgs,
    config: &AppConfig,
) -> Result<(ClientConfig, SchedulerConfig)> {
    let (client_config, mut scheduler_config) = config.to_runtime_config();

    if let Some(workers) = args.workers {
        scheduler_config.worker_count = workers;
    }
    if args.sequential {
        scheduler_config.mode = ExecutionMode::Sequential;
    }

    client_config.validate()?;
    scheduler_config.validate()?;
    Ok((client_config, scheduler_config))
}
