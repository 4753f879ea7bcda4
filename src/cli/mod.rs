//! Command-line interface components
//!
//! This module contains CLI-specific code for the Cloud Downloader
//! application: argument parsing, command handling and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, DownloadArgs, GlobalArgs};
pub use commands::{handle_download, handle_print_config, runtime_config};
pub use progress::{ProgressConfig, ProgressDisplay, ProgressSummary};
