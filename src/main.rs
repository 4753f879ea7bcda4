//! Cloud Downloader CLI application
//!
//! Downloads the partial copies listed in an index document and writes the
//! reassembled file.

use std::process;

use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use cloud_downloader::cli::{handle_download, handle_print_config, Cli};
use cloud_downloader::config::AppConfig;
use cloud_downloader::constants::logging::CRATE_TARGET;
use cloud_downloader::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.download.print_config {
        return handle_print_config();
    }

    let config = AppConfig::load(cli.global.config.clone()).await?;
    init_logging(&cli, config.logging.level.as_deref());

    info!("Cloud Downloader v{} starting", env!("CARGO_PKG_VERSION"));

    handle_download(&cli.global, cli.download.clone(), config).await
}

/// Initialize logging based on CLI verbosity and the configured level
fn init_logging(cli: &Cli, configured_level: Option<&str>) {
    let configured = configured_level.and_then(|level| level.parse::<Level>().ok());
    let log_level = cli.log_level(configured);

    let mut filter = EnvFilter::from_default_env();
    match format!("{}={}", CRATE_TARGET, log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log directive: {}", e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if configured_level.is_some() && configured.is_none() {
        warn!("Ignoring unknown log level in configuration: {:?}", configured_level);
    }
    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
