//! Job launcher
//!
//! Starts a server-side job and seeds the store with its stub record.

use std::sync::Arc;

use dossier_core::domain::job::JobRecord;
use dossier_core::dto::job::GenerateCv;
use tracing::{error, info};

use crate::error::{Result, TrackerError};
use crate::repository::JobCreator;
use crate::service::store::JobStore;

/// Launches generation jobs
pub struct JobLauncher {
    store: Arc<JobStore>,
    creator: Arc<dyn JobCreator>,
}

impl JobLauncher {
    pub fn new(store: Arc<JobStore>, creator: Arc<dyn JobCreator>) -> Self {
        Self { store, creator }
    }

    /// Creates a job and starts tracking it
    ///
    /// A job that was still being tracked is dropped from observation; it
    /// keeps running server-side. On failure the store is left untouched.
    pub async fn launch(&self, req: GenerateCv) -> Result<JobRecord> {
        let opportunity = req.opportunity.clone();

        let created = self.creator.create_job(req).await.map_err(|e| {
            error!("Failed to launch job: {:#}", e);
            TrackerError::Launch(e)
        })?;

        if created.job_id.trim().is_empty() {
            return Err(TrackerError::InvalidJob("empty job id".to_string()));
        }

        if let Some(previous) = self.store.active_job_id() {
            info!("Job {} superseded by job {}", previous, created.job_id);
        }

        let mut job = JobRecord::queued(created.job_id, opportunity);
        job.status = created.status;

        info!("Launched job {} ({})", job.id, job.status);
        self.store.set_job(Some(job.clone()));

        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::storage::{JOB_ID_KEY, MemoryStorage, SnapshotStorage};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use dossier_core::domain::job::JobStatus;
    use dossier_core::dto::job::{CreatedJob, CvFormat};
    use std::sync::Mutex;

    struct FakeCreator {
        ids: Mutex<Vec<&'static str>>,
        requests: Mutex<Vec<GenerateCv>>,
    }

    impl FakeCreator {
        fn new(ids: Vec<&'static str>) -> Self {
            Self {
                ids: Mutex::new(ids),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JobCreator for FakeCreator {
        async fn create_job(&self, req: GenerateCv) -> anyhow::Result<CreatedJob> {
            self.requests.lock().unwrap().push(req);
            let mut ids = self.ids.lock().unwrap();
            if ids.is_empty() {
                return Err(anyhow!("HTTP 500: generator offline"));
            }
            Ok(CreatedJob {
                job_id: ids.remove(0).to_string(),
                status: JobStatus::Queued,
            })
        }
    }

    fn setup(ids: Vec<&'static str>) -> (JobLauncher, Arc<JobStore>, Arc<FakeCreator>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = Arc::new(JobStore::new(Arc::new(storage.clone())));
        let creator = Arc::new(FakeCreator::new(ids));
        let creator_dyn: Arc<dyn JobCreator> = creator.clone();
        (
            JobLauncher::new(Arc::clone(&store), creator_dyn),
            store,
            creator,
            storage,
        )
    }

    #[tokio::test]
    async fn test_launch_seeds_queued_stub() {
        let (launcher, store, creator, storage) = setup(vec!["J1"]);

        let job = launcher
            .launch(GenerateCv {
                format: CvFormat::Pdf,
                opportunity: Some("acme-backend".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(job.id, "J1");
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert_eq!(job.opportunity.as_deref(), Some("acme-backend"));
        assert_eq!(store.job(), Some(job));
        assert_eq!(storage.read(JOB_ID_KEY).unwrap().as_deref(), Some("J1"));
        assert_eq!(creator.requests.lock().unwrap()[0].format, CvFormat::Pdf);
    }

    #[tokio::test]
    async fn test_launch_failure_leaves_store_untouched() {
        let (launcher, store, _, _) = setup(vec![]);
        let previous = JobRecord::queued("J0", None);
        store.set_job(Some(previous.clone()));

        let err = launcher.launch(GenerateCv::default()).await.unwrap_err();

        assert!(matches!(err, TrackerError::Launch(_)));
        assert!(err.to_string().contains("generator offline"));
        assert_eq!(store.job(), Some(previous));
    }

    #[tokio::test]
    async fn test_empty_job_id_is_rejected() {
        let (launcher, store, _, _) = setup(vec![" "]);

        let err = launcher.launch(GenerateCv::default()).await.unwrap_err();

        assert!(matches!(err, TrackerError::InvalidJob(_)));
        assert!(store.job().is_none());
    }

    #[tokio::test]
    async fn test_launch_overwrites_active_job() {
        let (launcher, store, _, _) = setup(vec!["J1", "J2"]);

        launcher.launch(GenerateCv::default()).await.unwrap();
        store.update_status(
            dossier_core::domain::job::JobUpdate::default()
                .status(JobStatus::Running)
                .progress(40),
        );

        let job = launcher.launch(GenerateCv::default()).await.unwrap();

        assert_eq!(job.id, "J2");
        let tracked = store.job().unwrap();
        assert_eq!(tracked.id, "J2");
        assert_eq!(tracked.status, JobStatus::Queued);
        assert_eq!(tracked.progress, 0);
    }
}
