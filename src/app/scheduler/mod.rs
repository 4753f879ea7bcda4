//! Concurrent fetch scheduling and deterministic reassembly
//!
//! The scheduler fans out one fetch per source onto a bounded pool of tokio
//! tasks, waits for every task at a join barrier, and only then stitches the
//! fragments together in source order. Completion order never affects the
//! output: each result lands in the slot of its source index.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloud_downloader::app::{reconcile, parse_index, RangeClient, FetchScheduler, SchedulerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = parse_index("f.bin\n20\nhost-a/f\nu:p\n0-9\nhost-b/f\nu:p\n5-19\n")?;
//! let plans = reconcile(&index.sources);
//!
//! let scheduler = FetchScheduler::new(Arc::new(RangeClient::default()), SchedulerConfig::default());
//! let data = scheduler.run(&index.sources, &plans).await?;
//! assert_eq!(data.len(), 20);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod pool;
pub mod types;

pub use config::{ExecutionMode, SchedulerConfig};
pub use pool::FetchScheduler;
pub use types::{FetchEvent, SlotOutcome};
