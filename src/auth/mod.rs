//! Credential handling for Basic-authenticated servers
//!
//! This module splits `username:password` strings, falls back to
//! environment variables (optionally loaded from a `.env` file), and encodes
//! credentials into `Authorization: Basic` header values.
//!
//! # Examples
//!
//! ```rust
//! use cloud_downloader::auth::Credentials;
//!
//! let creds = Credentials::parse("alice:open sesame").unwrap();
//! assert_eq!(creds.username(), "alice");
//! assert_eq!(creds.basic_header_value(), "Basic YWxpY2U6b3BlbiBzZXNhbWU=");
//! ```

pub mod credentials;

// Re-export main public API
pub use credentials::{basic_header_value, resolve_credentials, Credentials};
