//! Bounded fan-out of source fetches with an ordered fan-in
//!
//! Each source gets its own task and its own socket. A semaphore caps how many
//! of those tasks are fetching at once. Results are collected into a slot
//! array indexed by source position, so fragments are concatenated in index
//! order no matter which server answers first.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::config::{ExecutionMode, SchedulerConfig};
use super::types::{FetchEvent, SlotOutcome};
use crate::app::client::RangeClient;
use crate::app::index::SourceDescriptor;
use crate::app::plan::FetchPlan;
use crate::errors::{DownloadError, DownloadResult, SourceFailure};

/// Fans source fetches out over a bounded worker pool
#[derive(Debug, Clone)]
pub struct FetchScheduler {
    client: Arc<RangeClient>,
    config: SchedulerConfig,
    progress: Option<mpsc::Sender<FetchEvent>>,
}

impl FetchScheduler {
    /// Create a scheduler sharing `client` between its workers
    pub fn new(client: Arc<RangeClient>, config: SchedulerConfig) -> Self {
        Self {
            client,
            config,
            progress: None,
        }
    }

    /// Report per-source progress on `progress_tx`
    pub fn with_progress(mut self, progress_tx: mpsc::Sender<FetchEvent>) -> Self {
        self.progress = Some(progress_tx);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Fetch every source and return the reassembled bytes
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::SourcesFailed` naming every source whose slot
    /// could not be filled. Siblings of a failed source still run to
    /// completion before the error is returned.
    pub async fn run(
        &self,
        sources: &[SourceDescriptor],
        plans: &[FetchPlan],
    ) -> DownloadResult<Vec<u8>> {
        let slots = self.fetch_all(sources, plans).await;
        assemble(slots)
    }

    /// Fetch every source, returning one outcome per source in index order
    pub async fn fetch_all(
        &self,
        sources: &[SourceDescriptor],
        plans: &[FetchPlan],
    ) -> Vec<SlotOutcome> {
        debug_assert_eq!(sources.len(), plans.len());

        match self.config.mode {
            ExecutionMode::Sequential => {
                info!("Fetching {} sources sequentially", sources.len());
                self.fetch_sequential(sources, plans).await
            }
            ExecutionMode::Concurrent => {
                info!(
                    "Fetching {} sources with up to {} workers",
                    sources.len(),
                    self.config.worker_count
                );
                self.fetch_concurrent(sources, plans).await
            }
        }
    }

    async fn fetch_sequential(
        &self,
        sources: &[SourceDescriptor],
        plans: &[FetchPlan],
    ) -> Vec<SlotOutcome> {
        let mut slots = Vec::with_capacity(sources.len());
        for (index, (source, plan)) in sources.iter().zip(plans).enumerate() {
            slots.push(fetch_one(&self.client, index, source, plan, self.progress.as_ref()).await);
        }
        slots
    }

    async fn fetch_concurrent(
        &self,
        sources: &[SourceDescriptor],
        plans: &[FetchPlan],
    ) -> Vec<SlotOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.worker_count.max(1)));
        let mut tasks = JoinSet::new();

        for (index, (source, plan)) in sources.iter().zip(plans).enumerate() {
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let progress = self.progress.clone();
            let source = source.clone();
            let plan = *plan;

            tasks.spawn(async move {
                // Held for the whole fetch; the semaphore is never closed
                let _permit = semaphore.acquire_owned().await;
                let outcome = fetch_one(&client, index, &source, &plan, progress.as_ref()).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<SlotOutcome>> = sources.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => error!("Worker task terminated unexpectedly: {}", e),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    SlotOutcome::Failed(SourceFailure {
                        index,
                        url: sources[index].url.clone(),
                        error: "worker terminated unexpectedly".to_string(),
                    })
                })
            })
            .collect()
    }
}

async fn fetch_one(
    client: &RangeClient,
    index: usize,
    source: &SourceDescriptor,
    plan: &FetchPlan,
    progress: Option<&mpsc::Sender<FetchEvent>>,
) -> SlotOutcome {
    emit(progress, FetchEvent::Started { index }).await;
    debug!(
        "Source #{} {} range {} keep {}..{}",
        index, source.url, source.range, plan.trim_offset, plan.trim_length
    );

    match client.fetch_range(source, plan).await {
        Ok(fragment) => {
            emit(
                progress,
                FetchEvent::Completed {
                    index,
                    bytes: fragment.len() as u64,
                },
            )
            .await;
            SlotOutcome::Fragment(fragment)
        }
        Err(e) => {
            error!("Source #{} ({}) failed: {}", index, source.url, e);
            emit(
                progress,
                FetchEvent::Failed {
                    index,
                    error: e.to_string(),
                },
            )
            .await;
            SlotOutcome::Failed(SourceFailure {
                index,
                url: source.url.clone(),
                error: e.to_string(),
            })
        }
    }
}

async fn emit(progress: Option<&mpsc::Sender<FetchEvent>>, event: FetchEvent) {
    if let Some(tx) = progress {
        // A closed display must not stop the download
        let _ = tx.send(event).await;
    }
}

/// Concatenate fragments in slot order, failing if any slot failed
pub fn assemble(slots: Vec<SlotOutcome>) -> DownloadResult<Vec<u8>> {
    let total = slots.len();
    let mut fragments = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for slot in slots {
        match slot {
            SlotOutcome::Fragment(fragment) => fragments.push(fragment),
            SlotOutcome::Failed(failure) => failures.push(failure),
        }
    }

    if !failures.is_empty() {
        return Err(DownloadError::SourcesFailed { total, failures });
    }
    Ok(fragments.concat())
}
