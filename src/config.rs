//! Configuration management for Cloud Downloader
//!
//! Settings come from, in increasing precedence: built-in defaults, a TOML
//! file, and command-line flags. The file is optional; every section and key
//! may be omitted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, ExecutionMode, SchedulerConfig};
use crate::constants::{default_worker_count, files, http, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Socket-level HTTP settings
    pub client: ClientSection,
    /// Worker pool settings
    pub scheduler: SchedulerSection,
    /// Where and how the reassembled file is written
    pub output: OutputSection,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    /// Port used when a URL does not name one
    pub default_port: u16,
    /// Bytes requested per socket read
    pub buffer_size: usize,
    /// Idle time after which a response is considered complete
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            default_port: http::DEFAULT_PORT,
            buffer_size: http::READ_BUFFER_SIZE,
            read_timeout: http::READ_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            tcp_nodelay: true,
        }
    }
}

/// TOML-friendly scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Maximum concurrent fetches (None = derived from available parallelism)
    pub worker_count: Option<usize>,
    /// `concurrent` or `sequential`
    pub mode: ExecutionMode,
    /// Channel buffer size for progress events
    pub progress_buffer_size: usize,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            worker_count: None,
            mode: ExecutionMode::Concurrent,
            progress_buffer_size: workers::PROGRESS_BUFFER_SIZE,
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory the reassembled file is written into
    pub directory: PathBuf,
    /// Overwrite an existing file of the same name
    pub force: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            force: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given (error, warn, info, debug, trace)
    pub level: Option<String>,
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (ClientConfig, SchedulerConfig) {
        (
            self.client.to_runtime_config(),
            self.scheduler.to_runtime_config(),
        )
    }

    /// Load configuration from the first file found
    ///
    /// An explicit `config_file_override` must exist. Without one, the
    /// standard locations are searched and defaults are used if none exists.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        match config_path {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(files::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# Cloud Downloader Configuration
# Every key is optional; command-line flags take precedence.

[client]
# Port used when a URL has no explicit port
default_port = {}
# Bytes requested per socket read (minimum {})
buffer_size = {}
# A read that stalls this long ends the response
read_timeout = "{}s"
connect_timeout = "{}s"
tcp_nodelay = true

[scheduler]
# Maximum concurrent source fetches (defaults to {} on this machine)
# worker_count = 8
mode = "concurrent"  # concurrent or sequential
progress_buffer_size = {}

[output]
directory = "."
force = false

[logging]
# Used when no -v / --very-verbose / -q flag is given
# level = "warn"  # error, warn, info, debug, trace
"#,
            http::DEFAULT_PORT,
            http::MIN_READ_BUFFER_SIZE,
            http::READ_BUFFER_SIZE,
            http::READ_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            default_worker_count(),
            workers::PROGRESS_BUFFER_SIZE,
        )
    }
}

impl ClientSection {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            default_port: self.default_port,
            buffer_size: self.buffer_size,
            read_timeout: self.read_timeout,
            connect_timeout: self.connect_timeout,
            tcp_nodelay: self.tcp_nodelay,
            ..ClientConfig::default()
        }
    }
}

impl SchedulerSection {
    /// Convert to runtime SchedulerConfig
    pub fn to_runtime_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            worker_count: self.worker_count.unwrap_or_else(default_worker_count),
            mode: self.mode,
            progress_buffer_size: self.progress_buffer_size,
        }
    }
}
