//! Cloud Downloader Library
//!
//! Reassembles a file from overlapping partial copies hosted on independent
//! HTTP servers. An index document names the copies and their byte ranges;
//! every copy is fetched concurrently and the overlap between neighbours is
//! trimmed before the fragments are joined in index order.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
