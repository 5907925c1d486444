//! Configuration module
//!
//! Handles CLI configuration and maps it onto the tracker's.

use std::path::PathBuf;
use std::time::Duration;

use dossier_tracker::TrackerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the CV API
    pub api_url: String,
    /// Directory holding the tracked job snapshot
    pub state_dir: PathBuf,
    pub poll_interval_ms: u64,
}

impl Config {
    /// Tracker configuration for this invocation
    pub fn tracker(&self) -> TrackerConfig {
        TrackerConfig::new(self.api_url.trim_end_matches('/'))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_state_dir(&self.state_dir)
    }
}
