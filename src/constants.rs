//! Application constants for Cloud Downloader
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain. Runtime components never read these
//! directly; they are folded into the default configuration values.

use std::time::Duration;

/// Environment variable names for authentication
pub mod env {
    /// Environment variable name for the index username
    pub const USERNAME: &str = "CLOUD_DOWNLOADER_USERNAME";

    /// Environment variable name for the index password
    pub const PASSWORD: &str = "CLOUD_DOWNLOADER_PASSWORD";
}

/// HTTP wire constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("cloud-downloader/", env!("CARGO_PKG_VERSION"));

    /// Plain HTTP port used when the URL does not name one
    pub const DEFAULT_PORT: u16 = 80;

    /// Size of each socket read
    pub const READ_BUFFER_SIZE: usize = 4096;

    /// Smallest read buffer accepted by configuration
    pub const MIN_READ_BUFFER_SIZE: usize = 4096;

    /// A read that stalls this long is taken as end of stream
    pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Separator between the header block and the body
    pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

    /// Header consulted for the body length (matched case-sensitively)
    pub const CONTENT_LENGTH: &str = "Content-Length";

    /// The only status accepted from a server
    pub const STATUS_OK: u16 = 200;
}

/// Worker and concurrency configuration
pub mod workers {
    /// Worker count used when available parallelism cannot be determined
    pub const FALLBACK_WORKER_COUNT: usize = 4;

    /// Upper bound for the default worker count
    pub const MAX_DEFAULT_WORKER_COUNT: usize = 16;

    /// Hard ceiling accepted from configuration
    pub const MAX_WORKER_COUNT: usize = 256;

    /// Channel buffer size for progress events
    pub const PROGRESS_BUFFER_SIZE: usize = 64;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "cloud-downloader.toml";

    /// Directory under the user config dir holding `config.toml`
    pub const CONFIG_DIR_NAME: &str = "cloud-downloader";
}

/// Logging constants
pub mod logging {
    /// Target used for the crate's log directives
    pub const CRATE_TARGET: &str = "cloud_downloader";
}

// Re-export commonly used constants for convenience
pub use env::{PASSWORD as ENV_PASSWORD, USERNAME as ENV_USERNAME};
pub use http::{DEFAULT_PORT, READ_BUFFER_SIZE, USER_AGENT};
pub use workers::MAX_WORKER_COUNT;

/// Default worker pool size: available parallelism, capped
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(workers::FALLBACK_WORKER_COUNT)
        .min(workers::MAX_DEFAULT_WORKER_COUNT)
}
