//! Error types for Cloud Downloader
//!
//! This module defines the error types for every stage of a download run:
//! a single HTTP exchange, index parsing, the run as a whole, credentials and
//! configuration. Errors are designed to name the failing source or line so a
//! user can act on them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a single request/response exchange with one server
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL has no host component
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    /// TCP connection could not be established
    #[error("Failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection attempt did not complete in time
    #[error("Connection to {host} timed out after {seconds} seconds")]
    ConnectTimeout { host: String, seconds: u64 },

    /// Writing the request to the socket failed
    #[error("Failed to send request to {host}: {source}")]
    Send {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the response failed with something other than a timeout
    #[error("Failed to read response: {0}")]
    Read(#[source] std::io::Error),

    /// The first header line carried no numeric status token
    #[error("Malformed status line: {line:?}")]
    MalformedStatus { line: String },

    /// Server answered with a status other than 200
    #[error("Server returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },
}

/// Index document parsing errors
#[derive(Error, Debug)]
pub enum IndexError {
    /// The document lacks the filename and size lines
    #[error("Index document is missing its filename and size header lines")]
    MissingHeader,

    /// The index body is not valid UTF-8 text
    #[error("Index document is not valid UTF-8")]
    NotText(#[from] std::string::FromUtf8Error),

    /// A range line could not be split into two integers
    #[error("Invalid byte range at line {line}: {content:?}")]
    InvalidRange { line: usize, content: String },
}

/// A source whose slot could not be filled
#[derive(Debug)]
pub struct SourceFailure {
    /// Position of the source in the index document
    pub index: usize,
    /// URL the source was fetched from
    pub url: String,
    /// Rendered cause of the failure
    pub error: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source #{} ({}): {}", self.index, self.url, self.error)
    }
}

/// Run-level download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Fetching the index document failed
    #[error("Failed to fetch index from {url}: {source}")]
    Index {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The index document could not be parsed
    #[error(transparent)]
    Parse(#[from] IndexError),

    /// One or more sources failed; the reassembled file would be corrupt
    #[error("{} of {total} sources failed: {}", .failures.len(), format_failures(.failures))]
    SourcesFailed {
        total: usize,
        failures: Vec<SourceFailure>,
    },

    /// Destination file exists and force flag not set
    #[error("File already exists: {path}. Use --force to overwrite")]
    FileExists { path: PathBuf },

    /// Index filename would escape the output directory
    #[error("Refusing to write unsafe filename from index: {name:?}")]
    UnsafeFilename { name: String },

    /// Temp file could not be renamed into place
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// I/O error while writing output
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Credential errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Credentials were neither given nor found in the environment
    #[error(
        "Missing credentials. Pass <username:password> or set CLOUD_DOWNLOADER_USERNAME and CLOUD_DOWNLOADER_PASSWORD"
    )]
    MissingCredentials,

    /// Credential string has no ':' separator
    #[error("Invalid credentials: expected <username>:<password>")]
    MissingSeparator,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Credential error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if re-running the same command could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Download(DownloadError::Index { source, .. }) => matches!(
                source,
                FetchError::Connect { .. } | FetchError::ConnectTimeout { .. } | FetchError::Read(_)
            ),
            AppError::Download(DownloadError::SourcesFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(DownloadError::Parse(_)) => "index",
            AppError::Download(_) => "download",
            AppError::Auth(_) => "credentials",
            AppError::Config(_) => "config",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Single-exchange result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Index parsing result type alias
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Credential result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_failed_message_names_each_source() {
        let err = DownloadError::SourcesFailed {
            total: 3,
            failures: vec![
                SourceFailure {
                    index: 1,
                    url: "b.example/part".to_string(),
                    error: "connection refused".to_string(),
                },
                SourceFailure {
                    index: 2,
                    url: "c.example/part".to_string(),
                    error: "HTTP 404".to_string(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("2 of 3 sources failed"));
        assert!(message.contains("source #1 (b.example/part): connection refused"));
        assert!(message.contains("source #2 (c.example/part): HTTP 404"));
    }

    #[test]
    fn test_categories() {
        let index_err = AppError::Download(DownloadError::Parse(IndexError::MissingHeader));
        assert_eq!(index_err.category(), "index");

        let auth_err = AppError::Auth(AuthError::MissingSeparator);
        assert_eq!(auth_err.category(), "credentials");
        assert!(!auth_err.is_recoverable());
    }

    #[test]
    fn test_status_error_is_not_recoverable() {
        let err = AppError::Download(DownloadError::Index {
            url: "index.example/list".to_string(),
            source: FetchError::UnexpectedStatus {
                status: 401,
                url: "index.example/list".to_string(),
            },
        });
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("HTTP 401"));
    }
}
