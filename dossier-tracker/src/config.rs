//! Tracker configuration
//!
//! Defines where the CV API lives, how often a tracked job is polled and
//! where the job snapshot is persisted between runs.

use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default delay between two status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Default directory holding the persisted job snapshot
pub const DEFAULT_STATE_DIR: &str = ".dossier";

/// Tracker configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// CV API base URL (e.g., "http://localhost:8000")
    pub api_url: String,

    /// How often to query the status of an active job
    pub poll_interval: Duration,

    /// Directory holding the persisted job snapshot
    pub state_dir: PathBuf,
}

impl TrackerConfig {
    /// Creates a new configuration with default interval and state directory
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }

    /// Overrides the poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Overrides the state directory
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.state_dir.as_os_str().is_empty() {
            anyhow::bail!("state_dir cannot be empty");
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
