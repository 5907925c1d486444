//! Progress presenter
//!
//! Maps the tracked job to a display state. The only write path back into
//! the store is the user's clear action.

use std::fmt;
use std::sync::Arc;

use dossier_client::resolve_download_url;
use dossier_core::domain::job::{JobRecord, JobStatus};

use crate::service::store::JobStore;

/// Download affordance for a finished job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Absolute URL of the generated document
    pub url: String,
    pub file_name: Option<String>,
    /// Size in bytes
    pub size: Option<u64>,
}

impl Download {
    /// Size in kilobytes with one decimal, e.g. `12.3 KB`
    pub fn human_size(&self) -> Option<String> {
        self.size.map(format_size)
    }
}

/// What the user sees for the current job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressView {
    /// No job is tracked
    Idle,
    Queued {
        stage: String,
    },
    Running {
        stage: String,
        progress: u8,
    },
    Success {
        stage: String,
        download: Option<Download>,
    },
    Error {
        stage: String,
        /// Server-side error message, shown on demand
        detail: Option<String>,
    },
}

/// Terminal notification derived from a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Carries the absolute download URL
    Completed(String),
    /// Carries the error message
    Failed(String),
}

impl ProgressView {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressView::Success { .. } | ProgressView::Error { .. })
    }

    /// Notification for terminal views
    ///
    /// A success without a download reference yields nothing. A failure
    /// without a detail falls back to the stage label.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            ProgressView::Success {
                download: Some(download),
                ..
            } => Some(Outcome::Completed(download.url.clone())),
            ProgressView::Error { stage, detail } => Some(Outcome::Failed(
                detail.clone().unwrap_or_else(|| stage.clone()),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for ProgressView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressView::Idle => write!(f, "No CV generation in progress"),
            ProgressView::Queued { stage } => write!(f, "{}: waiting to start", stage),
            ProgressView::Running { stage, progress } => write!(f, "{} ({}%)", stage, progress),
            ProgressView::Success { stage, .. } => write!(f, "CV generated: {}", stage),
            ProgressView::Error { stage, .. } => write!(f, "Generation failed: {}", stage),
        }
    }
}

/// Builds the view for `job`
///
/// Relative download paths are resolved against `base_url`.
pub fn present(job: Option<&JobRecord>, base_url: &str) -> ProgressView {
    let Some(job) = job else {
        return ProgressView::Idle;
    };

    let stage = job.stage.clone();
    match job.status {
        JobStatus::Queued => ProgressView::Queued { stage },
        JobStatus::Running => ProgressView::Running {
            stage,
            progress: job.progress.min(100),
        },
        JobStatus::Success => ProgressView::Success {
            stage,
            download: job.output.as_ref().map(|output| Download {
                url: resolve_download_url(base_url, &output.download_url),
                file_name: output.file_name.clone(),
                size: output.size,
            }),
        },
        JobStatus::Error => ProgressView::Error {
            stage,
            detail: job.error_message.clone(),
        },
    }
}

fn format_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Read-only view over the store
pub struct Presenter {
    store: Arc<JobStore>,
    base_url: String,
}

impl Presenter {
    pub fn new(store: Arc<JobStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    /// Current view of the tracked job
    pub fn view(&self) -> ProgressView {
        present(self.store.job().as_ref(), &self.base_url)
    }

    /// Dismisses the tracked job
    pub fn clear(&self) {
        self.store.clear();
    }
}
