//! Core data structures for index documents

use std::fmt;

/// Inclusive byte range a source claims to serve
///
/// Bounds are signed and unvalidated: the index is trusted as declared and
/// reconciliation tolerates nonsensical ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
}

impl ByteRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered; negative for reversed ranges
    ///
    /// Saturates at the `i64` bounds for extreme declared values.
    pub fn len(&self) -> i64 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One partial copy of the target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Scheme-less `host[:port]/path`
    pub url: String,
    /// Raw `username:password`
    pub credentials: String,
    /// Declared inclusive byte range
    pub range: ByteRange,
}

/// A parsed index document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    /// Destination name for the reassembled file
    pub filename: String,
    /// Total size as written in the index
    pub declared_size: String,
    /// Sources in reassembly order
    pub sources: Vec<SourceDescriptor>,
}

impl IndexDocument {
    /// Declared size as a number, when it parses as one
    pub fn declared_size_bytes(&self) -> Option<u64> {
        self.declared_size.trim().parse().ok()
    }

    /// Highest byte offset claimed by any source, plus one
    pub fn covered_size(&self) -> u64 {
        self.sources
            .iter()
            .map(|source| source.range.end.saturating_add(1).max(0) as u64)
            .max()
            .unwrap_or(0)
    }
}
