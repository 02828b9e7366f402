//! Configuration for batch decoding.
//!
//! The decoder itself has no settings: every prefix and limit it uses is
//! fixed by the file format. These options only steer how many files are
//! decoded at once and how station tables are assembled.

use crate::error::{PirataError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Global configuration for PIRATA batch processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PirataConfig {
    /// Maximum number of files decoded concurrently
    pub max_concurrent_files: usize,

    /// Sort each station table by timestamp after merging
    pub sort_by_time: bool,

    /// Count unreadable files as failed instead of aborting the batch
    pub skip_failed_files: bool,
}

impl Default for PirataConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get(),
            sort_by_time: true,
            skip_failed_files: true,
        }
    }
}

impl PirataConfig {
    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Keep station tables in join order
    pub fn without_sorting(mut self) -> Self {
        self.sort_by_time = false;
        self
    }

    /// Abort the batch on the first file that fails
    pub fn with_fail_fast(mut self) -> Self {
        self.skip_failed_files = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(PirataError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }

        debug!(
            "Configuration: {} concurrent files, sort_by_time={}, skip_failed_files={}",
            self.max_concurrent_files, self.sort_by_time, self.skip_failed_files
        );
        Ok(())
    }
}
