//! Types shared between the scheduler and its observers

use crate::errors::SourceFailure;

/// Progress events emitted while a run is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// The index was parsed and the run is about to fan out
    Planned {
        sources: usize,
        expected_bytes: u64,
    },
    /// A worker picked up a source
    Started { index: usize },
    /// A source delivered its trimmed fragment
    Completed { index: usize, bytes: u64 },
    /// A source failed
    Failed { index: usize, error: String },
}

/// Content of one result slot after the join barrier
#[derive(Debug)]
pub enum SlotOutcome {
    Fragment(Vec<u8>),
    Failed(SourceFailure),
}

impl SlotOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SlotOutcome::Failed(_))
    }
}
