//! Download orchestration
//!
//! Ties the stages of a run together: fetch and parse the index, reconcile
//! the source ranges, fan the sources out over the scheduler and hand back the
//! reassembled bytes. Nothing is written to disk here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cloud_downloader::app::{ClientConfig, CloudDownloader, SchedulerConfig};
//! use cloud_downloader::auth::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = CloudDownloader::new(ClientConfig::default(), SchedulerConfig::default());
//! let credentials = Credentials::parse("alice:secret")?;
//!
//! let file = downloader.download("index.example.com/movie", &credentials).await?;
//! println!("{}: {} bytes", file.filename, file.data.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::client::{ClientConfig, RangeClient};
use crate::app::index::{parse_index_bytes, IndexDocument};
use crate::app::plan::{expected_total, reconcile};
use crate::app::scheduler::{FetchEvent, FetchScheduler, SchedulerConfig};
use crate::auth::Credentials;
use crate::errors::{DownloadError, DownloadResult};

/// Result of a successful run, held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassembled {
    /// Destination name taken from the index
    pub filename: String,
    /// Size line of the index, verbatim
    pub declared_size: String,
    /// Concatenated fragments in source order
    pub data: Vec<u8>,
    /// Number of sources fetched
    pub sources: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl Reassembled {
    /// Whether the byte count disagrees with a numeric declared size
    pub fn size_mismatch(&self) -> Option<(u64, u64)> {
        let declared: u64 = self.declared_size.trim().parse().ok()?;
        let actual = self.data.len() as u64;
        (declared != actual).then_some((declared, actual))
    }
}

/// Orchestrates one index-driven download
#[derive(Debug, Clone)]
pub struct CloudDownloader {
    client: Arc<RangeClient>,
    scheduler_config: SchedulerConfig,
    progress: Option<mpsc::Sender<FetchEvent>>,
}

impl CloudDownloader {
    pub fn new(client_config: ClientConfig, scheduler_config: SchedulerConfig) -> Self {
        Self {
            client: Arc::new(RangeClient::new(client_config)),
            scheduler_config,
            progress: None,
        }
    }

    /// Report planning and per-source events on `progress_tx`
    pub fn with_progress(mut self, progress_tx: mpsc::Sender<FetchEvent>) -> Self {
        self.progress = Some(progress_tx);
        self
    }

    /// Fetch and parse the index document
    ///
    /// The index must answer 200; any other status aborts the run before a
    /// single source is contacted.
    pub async fn fetch_index(
        &self,
        index_url: &str,
        credentials: &Credentials,
    ) -> DownloadResult<IndexDocument> {
        info!("Fetching index from {}", index_url);
        let response = self
            .client
            .fetch(index_url, &credentials.to_raw())
            .await
            .map_err(|source| DownloadError::Index {
                url: index_url.to_string(),
                source,
            })?;

        let index = parse_index_bytes(response.body)?;
        if let Some(declared) = index.declared_size_bytes() {
            let covered = index.covered_size();
            if covered < declared {
                warn!(
                    "Sources only cover {} of {} declared bytes",
                    covered, declared
                );
            }
        }
        info!(
            "Index lists {} sources for {} ({} bytes declared)",
            index.sources.len(),
            index.filename,
            index.declared_size
        );
        Ok(index)
    }

    /// Run the whole pipeline and return the reassembled file
    pub async fn download(
        &self,
        index_url: &str,
        credentials: &Credentials,
    ) -> DownloadResult<Reassembled> {
        let started = Instant::now();
        let index = self.fetch_index(index_url, credentials).await?;
        let plans = reconcile(&index.sources);

        if let Some(tx) = &self.progress {
            let expected_bytes = expected_total(&plans);
            let _ = tx
                .send(FetchEvent::Planned {
                    sources: index.sources.len(),
                    expected_bytes,
                })
                .await;
        }

        let mut scheduler = FetchScheduler::new(Arc::clone(&self.client), self.scheduler_config.clone());
        if let Some(tx) = &self.progress {
            scheduler = scheduler.with_progress(tx.clone());
        }

        let data = scheduler.run(&index.sources, &plans).await?;

        let file = Reassembled {
            filename: index.filename,
            declared_size: index.declared_size,
            data,
            sources: index.sources.len(),
            elapsed: started.elapsed(),
        };

        if let Some((declared, actual)) = file.size_mismatch() {
            warn!(
                "Reassembled {} bytes but the index declares {} bytes",
                actual, declared
            );
        }
        info!(
            "Reassembled {} ({} bytes from {} sources) in {:?}",
            file.filename,
            file.data.len(),
            file.sources,
            file.elapsed
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassembled(declared_size: &str, len: usize) -> Reassembled {
        Reassembled {
            filename: "f.bin".to_string(),
            declared_size: declared_size.to_string(),
            data: vec![0u8; len],
            sources: 1,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_size_mismatch() {
        assert_eq!(reassembled("10", 10).size_mismatch(), None);
        assert_eq!(reassembled("12", 10).size_mismatch(), Some((12, 10)));
        // Non-numeric sizes are informational only
        assert_eq!(reassembled("ten", 10).size_mismatch(), None);
    }

    #[tokio::test]
    async fn test_unreachable_index_is_index_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let downloader = CloudDownloader::new(ClientConfig::default(), SchedulerConfig::default());
        let credentials = Credentials::parse("u:p").unwrap();
        let result = downloader
            .download(&format!("{}/index", addr), &credentials)
            .await;
        assert!(matches!(result, Err(DownloadError::Index { .. })));
    }
}
