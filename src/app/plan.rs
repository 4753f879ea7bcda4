//! Range reconciliation
//!
//! Consecutive sources overlap: each one repeats some tail of its
//! predecessor. Reconciliation walks the sources in order with a cursor at the
//! previous source's end and decides, per source, which slice of its payload
//! is new data.
//!
//! For sources `[0,99]`, `[50,149]`, `[130,199]` the plans are
//! `(0,100)`, `(50,100)`, `(20,70)`: keep all of the first payload, skip the
//! 50 bytes of the second that the first already delivered, skip 20 bytes of
//! the third.

use crate::app::index::{ByteRange, SourceDescriptor};

/// Which part of a source's payload to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    /// Leading payload bytes that duplicate the previous source
    pub trim_offset: i64,
    /// Exclusive slice end, counted from the start of the payload
    pub trim_length: i64,
}

impl FetchPlan {
    pub fn new(trim_offset: i64, trim_length: i64) -> Self {
        Self {
            trim_offset,
            trim_length,
        }
    }

    /// Slice `body[trim_offset..trim_length]`, clamped to the body
    ///
    /// Never panics. A negative offset, an offset past the end of the body, or
    /// an offset at or beyond the slice end all yield an empty fragment; an end
    /// past the body is cut to the body length.
    pub fn apply<'a>(&self, body: &'a [u8]) -> &'a [u8] {
        if self.trim_offset < 0 {
            return &[];
        }

        let len = body.len() as i64;
        let start = self.trim_offset.min(len);
        let end = self.trim_length.clamp(0, len);
        if start >= end {
            return &[];
        }
        &body[start as usize..end as usize]
    }

    /// Bytes this plan keeps when the payload is complete
    pub fn expected_len(&self) -> u64 {
        if self.trim_offset < 0 {
            return 0;
        }
        self.trim_length.saturating_sub(self.trim_offset).max(0) as u64
    }
}

/// Running reconciliation state
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    /// End of the previous source; `None` before the first
    cursor: Option<i64>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor (end of the last reconciled range)
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Compute the plan for the next range and advance the cursor to its end
    pub fn next_plan(&mut self, range: ByteRange) -> FetchPlan {
        let trim_offset = match self.cursor {
            None => 0,
            Some(previous_end) => previous_end.saturating_sub(range.start).saturating_add(1),
        };
        self.cursor = Some(range.end);
        FetchPlan::new(trim_offset, range.len())
    }
}

/// Compute one plan per source, in source order
pub fn reconcile(sources: &[SourceDescriptor]) -> Vec<FetchPlan> {
    let mut reconciler = Reconciler::new();
    let plans: Vec<FetchPlan> = sources
        .iter()
        .map(|source| reconciler.next_plan(source.range))
        .collect();

    for (index, (source, plan)) in sources.iter().zip(&plans).enumerate() {
        if plan.trim_offset < 0 || plan.trim_offset > plan.trim_length {
            tracing::warn!(
                "Source #{} range {} does not overlap its predecessor as expected (trim {}..{}); its fragment will be empty",
                index,
                source.range,
                plan.trim_offset,
                plan.trim_length
            );
        }
    }

    plans
}

/// Bytes all `plans` keep together, saturating at `u64::MAX`
pub fn expected_total(plans: &[FetchPlan]) -> u64 {
    plans
        .iter()
        .fold(0u64, |total, plan| total.saturating_add(plan.expected_len()))
}
