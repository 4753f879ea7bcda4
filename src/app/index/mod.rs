//! Index document model and parsing
//!
//! The index is a plain-text manifest fetched from the index server. Its first
//! line names the reassembled file, its second line gives the total size, and
//! every following group of three lines describes one partial source:
//!
//! ```text
//! movie.mp4
//! 200
//! host-a.example/parts/movie.mp4
//! alice:secret
//! 0-99
//! host-b.example/movie.mp4.part2
//! bob:hunter2
//! 50-199
//! ```
//!
//! # Examples
//!
//! ```rust
//! use cloud_downloader::app::index::parse_index;
//!
//! let index = parse_index("a.bin\n10\nhost/a\nu:p\n0-9\n").unwrap();
//! assert_eq!(index.filename, "a.bin");
//! assert_eq!(index.sources.len(), 1);
//! assert_eq!(index.sources[0].range.len(), 10);
//! ```

pub mod parser;
pub mod types;

pub use parser::{parse_index, parse_index_bytes, parse_range};
pub use types::{ByteRange, IndexDocument, SourceDescriptor};
