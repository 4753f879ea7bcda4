//! Scheduler configuration
//!
//! The pool size defaults to the machine's available parallelism, capped, so
//! an index with hundreds of sources never opens hundreds of sockets at once.

use serde::{Deserialize, Serialize};

use crate::constants::{default_worker_count, workers};
use crate::errors::{ConfigError, ConfigResult};

/// How source fetches are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Bounded pool of concurrent worker tasks
    Concurrent,
    /// One source at a time, in index order, on the calling task
    Sequential,
}

/// Configuration for the fetch scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of fetches in flight
    pub worker_count: usize,
    /// Concurrent or sequential execution
    pub mode: ExecutionMode,
    /// Channel buffer size for progress events
    pub progress_buffer_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            mode: ExecutionMode::Concurrent,
            progress_buffer_size: workers::PROGRESS_BUFFER_SIZE,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.worker_count".to_string(),
                value: "0".to_string(),
                reason: "Worker count cannot be zero".to_string(),
            });
        }

        if self.worker_count > workers::MAX_WORKER_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.worker_count".to_string(),
                value: self.worker_count.to_string(),
                reason: format!("Must not exceed {}", workers::MAX_WORKER_COUNT),
            });
        }

        Ok(())
    }

    /// Set the worker count
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Run sources one at a time
    pub fn sequential(mut self) -> Self {
        self.mode = ExecutionMode::Sequential;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bounded() {
        let config = SchedulerConfig::default();
        assert!(config.worker_count >= 1);
        assert!(config.worker_count <= workers::MAX_DEFAULT_WORKER_COUNT);
        assert_eq!(config.mode, ExecutionMode::Concurrent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_count_validation() {
        assert!(SchedulerConfig::default()
            .with_worker_count(0)
            .validate()
            .is_err());
        assert!(SchedulerConfig::default()
            .with_worker_count(workers::MAX_WORKER_COUNT + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ExecutionMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"sequential\"").unwrap();
        assert_eq!(parsed.mode, ExecutionMode::Sequential);
    }
}
