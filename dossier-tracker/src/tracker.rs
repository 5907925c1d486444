//! Tracker facade
//!
//! Bundles the store with its collaborators. The rest of the application
//! reads the tracked job through here and only ever writes to it by
//! launching or clearing.

use std::sync::Arc;

use anyhow::Context;
use dossier_core::domain::job::JobRecord;
use dossier_core::dto::job::GenerateCv;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::repository::{HttpJobRepository, JobCreator, StatusFetcher};
use crate::scheduler::{JobPoller, PollerHandle};
use crate::service::{FileStorage, JobLauncher, JobStore, Presenter, ProgressView, SnapshotStorage};

/// Snapshot of the tracked job offered to readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerState {
    pub job: Option<JobRecord>,
}

/// Entry point to job tracking
pub struct JobTracker {
    config: TrackerConfig,
    store: Arc<JobStore>,
    fetcher: Arc<dyn StatusFetcher>,
    launcher: JobLauncher,
    presenter: Presenter,
}

impl JobTracker {
    /// Opens the tracker described by `config`
    ///
    /// Talks HTTP to `config.api_url` and restores the job persisted under
    /// `config.state_dir`.
    pub fn open(config: TrackerConfig) -> anyhow::Result<Self> {
        config.validate().context("Invalid tracker configuration")?;

        let storage = Arc::new(FileStorage::new(&config.state_dir));
        let repository = Arc::new(HttpJobRepository::new(&config.api_url));

        info!(
            "Opening tracker (api: {}, state: {})",
            config.api_url,
            config.state_dir.display()
        );

        Ok(Self::with_parts(
            config,
            storage,
            repository.clone(),
            repository,
        ))
    }

    /// Builds a tracker over explicit collaborators, restoring from `storage`
    pub fn with_parts(
        config: TrackerConfig,
        storage: Arc<dyn SnapshotStorage>,
        fetcher: Arc<dyn StatusFetcher>,
        creator: Arc<dyn JobCreator>,
    ) -> Self {
        let store = Arc::new(JobStore::restore(storage));
        let launcher = JobLauncher::new(Arc::clone(&store), creator);
        let presenter = Presenter::new(Arc::clone(&store), config.api_url.clone());

        Self {
            config,
            store,
            fetcher,
            launcher,
            presenter,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Id of the tracked job while it is queued or running
    pub fn active_job_id(&self) -> Option<String> {
        self.store.active_job_id()
    }

    pub fn state(&self) -> TrackerState {
        TrackerState {
            job: self.store.job(),
        }
    }

    pub fn view(&self) -> ProgressView {
        self.presenter.view()
    }

    /// Dismisses the tracked job, whatever its status
    pub fn clear(&self) {
        self.presenter.clear();
    }

    /// Notifies on every change of the tracked job
    pub fn subscribe(&self) -> watch::Receiver<Option<JobRecord>> {
        self.store.subscribe()
    }

    /// Starts a new job, superseding the tracked one
    pub async fn launch(&self, req: GenerateCv) -> Result<JobRecord> {
        self.launcher.launch(req).await
    }

    /// Spawns the poller; it stops when `shutdown` is cancelled
    pub fn start_polling(&self, shutdown: CancellationToken) -> PollerHandle {
        JobPoller::new(
            Arc::clone(&self.store),
            Arc::clone(&self.fetcher),
            self.config.poll_interval,
        )
        .spawn(shutdown)
    }
}
