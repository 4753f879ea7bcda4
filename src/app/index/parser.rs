//! Line-oriented index parser
//!
//! Lines 0 and 1 are the filename and declared size. From line 2 on, lines
//! are consumed in triples of (url, credentials, `start-end`); an incomplete
//! trailing group is ignored.

use tracing::{debug, warn};

use super::types::{ByteRange, IndexDocument, SourceDescriptor};
use crate::errors::{IndexError, IndexResult};

const HEADER_LINES: usize = 2;
const LINES_PER_SOURCE: usize = 3;

/// Parse an index body received from the wire
pub fn parse_index_bytes(body: Vec<u8>) -> IndexResult<IndexDocument> {
    let text = String::from_utf8(body)?;
    parse_index(&text)
}

/// Parse index document text
pub fn parse_index(text: &str) -> IndexResult<IndexDocument> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if lines.len() < HEADER_LINES {
        return Err(IndexError::MissingHeader);
    }

    let filename = lines[0].to_string();
    let declared_size = lines[1].to_string();

    let body = &lines[HEADER_LINES..];
    let chunks = body.chunks_exact(LINES_PER_SOURCE);
    let leftover = chunks.remainder();
    // A single empty leftover is just the trailing newline
    if !leftover.is_empty() && !(leftover.len() == 1 && leftover[0].is_empty()) {
        warn!(
            "Ignoring {} trailing index lines that do not form a complete source",
            leftover.len()
        );
    }

    let sources = chunks
        .enumerate()
        .map(|(i, triple)| {
            let line = HEADER_LINES + i * LINES_PER_SOURCE + 2;
            Ok(SourceDescriptor {
                url: triple[0].to_string(),
                credentials: triple[1].to_string(),
                range: parse_range(triple[2]).ok_or_else(|| IndexError::InvalidRange {
                    line: line + 1,
                    content: triple[2].to_string(),
                })?,
            })
        })
        .collect::<IndexResult<Vec<_>>>()?;

    debug!(
        "Parsed index for {:?} ({} bytes declared) with {} sources",
        filename,
        declared_size,
        sources.len()
    );

    Ok(IndexDocument {
        filename,
        declared_size,
        sources,
    })
}

/// Split `start-end` on its first `-` into two integers
///
/// No sign or ordering validation is applied.
pub fn parse_range(text: &str) -> Option<ByteRange> {
    let (start, end) = text.split_once('-')?;
    let start = start.trim().parse::<i64>().ok()?;
    let end = end.trim().parse::<i64>().ok()?;
    Some(ByteRange::new(start, end))
}
