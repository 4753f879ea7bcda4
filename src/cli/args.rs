//! Command-line argument parsing for Cloud Downloader
//!
//! This module defines the CLI structure using clap derive macros. The tool
//! has a single action, so download arguments sit at the top level next to
//! the global logging and configuration flags.

use std::path::PathBuf;

use clap::{Args, Parser};

/// Cloud Downloader - Reassemble a file from overlapping partial copies
#[derive(Parser, Debug)]
#[command(
    name = "cloud_downloader",
    version,
    about = "Reassemble a file from overlapping partial copies on several HTTP servers",
    long_about = "Fetches an index document listing partial copies of a file, downloads every copy
concurrently with HTTP Basic authentication, trims the overlap between consecutive copies
and writes the reassembled file under the name given in the index."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Download options
    #[command(flatten)]
    pub download: DownloadArgs,
}

/// Logging and configuration options
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - suppress progress and non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for a download run
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Index document location, as host[:port]/path
    #[arg(value_name = "INDEX_URL", required_unless_present = "print_config")]
    pub index_url: Option<String>,

    /// Credentials for the index server (falls back to CLOUD_DOWNLOADER_USERNAME/PASSWORD)
    #[arg(value_name = "USERNAME:PASSWORD")]
    pub credentials: Option<String>,

    /// Maximum number of concurrent source fetches
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Fetch sources one at a time, in index order
    #[arg(long)]
    pub sequential: bool,

    /// Directory to write the reassembled file into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Overwrite an existing file of the same name
    #[arg(short, long)]
    pub force: bool,

    /// Print a default configuration file and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    ///
    /// Verbosity flags win over `configured`; with neither, warnings and
    /// errors are shown.
    pub fn log_level(&self, configured: Option<tracing::Level>) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            configured.unwrap_or(tracing::Level::WARN)
        }
    }
}

impl DownloadArgs {
    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == Some(0) {
            return Err("Number of workers must be greater than 0".to_string());
        }

        if self.sequential && self.workers.is_some() {
            return Err("Cannot specify both --sequential and --workers".to_string());
        }

        Ok(())
    }
}
