//! Job store
//!
//! Holds the single tracked job and mirrors every change into snapshot
//! storage. The slot is a `watch` channel: each mutation is one atomic
//! replace/modify of the channel value, and subscribers observe every
//! committed state.

use std::sync::Arc;

use dossier_core::domain::job::{JobRecord, JobUpdate};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::service::storage::{JOB_ID_KEY, JOB_KEY, SnapshotStorage};

/// Single source of truth for the tracked job
pub struct JobStore {
    slot: watch::Sender<Option<JobRecord>>,
    storage: Arc<dyn SnapshotStorage>,
}

impl JobStore {
    /// Creates an empty store; nothing is read from or written to storage
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot, storage }
    }

    /// Creates a store seeded from the persisted snapshot
    ///
    /// Terminal records are loaded as well so the last outcome can still be
    /// displayed; whether anything gets polled is the poller's decision.
    pub fn restore(storage: Arc<dyn SnapshotStorage>) -> Self {
        let store = Self::new(storage);

        match store.load_snapshot() {
            Restored::Snapshot(job) => {
                info!("Restored job {} ({}) from snapshot", job.id, job.status);
                store.slot.send_replace(Some(job));
            }
            Restored::LegacyId(id) => {
                info!("Restored job {} from legacy id snapshot", id);
                store.set_job(Some(JobRecord::queued(id, None)));
            }
            Restored::Empty => debug!("No job snapshot to restore"),
        }

        store
    }

    /// Current job, if any
    pub fn job(&self) -> Option<JobRecord> {
        self.slot.borrow().clone()
    }

    /// Id of the tracked job while it is queued or running
    pub fn active_job_id(&self) -> Option<String> {
        active_job_id(self.slot.borrow().as_ref())
    }

    /// Subscribes to store changes
    pub fn subscribe(&self) -> watch::Receiver<Option<JobRecord>> {
        self.slot.subscribe()
    }

    /// Replaces the tracked job wholesale
    ///
    /// `None` drops the tracked job and deletes the snapshot.
    pub fn set_job(&self, job: Option<JobRecord>) {
        self.slot.send_modify(|slot| {
            *slot = job;
            self.persist(slot.as_ref());
        });
    }

    /// Merges a partial update into the tracked job
    ///
    /// Ignored when no job is tracked, when the update names a different job
    /// id, or when the tracked job already reached a terminal status. Returns
    /// the merged record when the update was applied.
    pub fn update_status(&self, update: JobUpdate) -> Option<JobRecord> {
        let mut merged = None;

        self.slot.send_if_modified(|slot| {
            let Some(job) = slot.as_mut() else {
                debug!("No tracked job, dropping status update");
                return false;
            };

            if let Some(id) = update.id.as_deref() {
                if id != job.id {
                    debug!("Dropping status update for job {} (tracking {})", id, job.id);
                    return false;
                }
            }

            if job.is_terminal() {
                debug!("Job {} is already {}, dropping status update", job.id, job.status);
                return false;
            }

            job.merge(update);
            self.persist(Some(job));
            merged = Some(job.clone());
            true
        });

        merged
    }

    /// Drops the tracked job and deletes the snapshot
    pub fn clear(&self) {
        self.set_job(None);
    }

    fn persist(&self, job: Option<&JobRecord>) {
        let result = match job {
            Some(job) => self.write_snapshot(job),
            None => self.remove_snapshot(),
        };

        if let Err(e) = result {
            warn!("Failed to persist job snapshot: {}", e);
        }
    }

    fn write_snapshot(&self, job: &JobRecord) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(job)?;
        self.storage.write(JOB_KEY, &encoded)?;
        self.storage.write(JOB_ID_KEY, &job.id)
    }

    fn remove_snapshot(&self) -> Result<(), StorageError> {
        self.storage.remove(JOB_KEY)?;
        self.storage.remove(JOB_ID_KEY)
    }

    fn load_snapshot(&self) -> Restored {
        match self.storage.read(JOB_KEY) {
            Ok(Some(encoded)) => match serde_json::from_str::<JobRecord>(&encoded) {
                Ok(job) => return Restored::Snapshot(job),
                Err(e) => {
                    warn!("Discarding corrupt job snapshot: {}", e);
                    if let Err(e) = self.remove_snapshot() {
                        warn!("Failed to delete corrupt job snapshot: {}", e);
                    }
                    return Restored::Empty;
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to read job snapshot: {}", e);
                return Restored::Empty;
            }
        }

        match self.storage.read(JOB_ID_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => Restored::LegacyId(id.trim().to_string()),
            Ok(_) => Restored::Empty,
            Err(e) => {
                warn!("Failed to read legacy job id: {}", e);
                Restored::Empty
            }
        }
    }
}

/// Id of `job` if it still needs observing
pub fn active_job_id(job: Option<&JobRecord>) -> Option<String> {
    job.filter(|job| job.status.is_active())
        .map(|job| job.id.clone())
}

enum Restored {
    Snapshot(JobRecord),
    LegacyId(String),
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::storage::MemoryStorage;
    use dossier_core::domain::job::{JobOutput, JobStatus};

    struct BrokenStorage;

    impl SnapshotStorage for BrokenStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    fn store_with_memory() -> (JobStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (JobStore::new(Arc::new(storage.clone())), storage)
    }

    fn persisted(storage: &MemoryStorage) -> Option<JobRecord> {
        storage
            .read(JOB_KEY)
            .unwrap()
            .map(|s| serde_json::from_str(&s).unwrap())
    }

    #[test]
    fn test_set_job_persists_both_keys() {
        let (store, storage) = store_with_memory();
        let job = JobRecord::queued("J1", None);

        store.set_job(Some(job.clone()));

        assert_eq!(store.job(), Some(job.clone()));
        assert_eq!(persisted(&storage), Some(job));
        assert_eq!(storage.read(JOB_ID_KEY).unwrap().as_deref(), Some("J1"));
    }

    #[test]
    fn test_set_job_none_removes_snapshot() {
        let (store, storage) = store_with_memory();
        store.set_job(Some(JobRecord::queued("J1", None)));

        store.set_job(None);

        assert!(store.job().is_none());
        assert!(storage.read(JOB_KEY).unwrap().is_none());
        assert!(storage.read(JOB_ID_KEY).unwrap().is_none());
    }

    #[test]
    fn test_update_without_job_is_noop() {
        let (store, storage) = store_with_memory();

        let merged = store.update_status(JobUpdate::default().status(JobStatus::Running));

        assert!(merged.is_none());
        assert!(store.job().is_none());
        assert!(storage.read(JOB_KEY).unwrap().is_none());
    }

    #[test]
    fn test_update_merges_and_persists() {
        let (store, storage) = store_with_memory();
        store.set_job(Some(JobRecord::queued("J1", None)));

        let merged = store
            .update_status(
                JobUpdate::default()
                    .for_job("J1")
                    .status(JobStatus::Running)
                    .progress(10)
                    .stage("Rendering"),
            )
            .unwrap();

        assert_eq!(merged.id, "J1");
        assert_eq!(merged.status, JobStatus::Running);
        assert_eq!(merged.progress, 10);
        assert_eq!(merged.stage, "Rendering");
        assert_eq!(persisted(&storage), Some(merged));
    }

    #[test]
    fn test_updates_are_last_write_wins() {
        let (store, _) = store_with_memory();
        store.set_job(Some(JobRecord::queued("J1", None)));

        store.update_status(JobUpdate::default().status(JobStatus::Running).progress(10));
        store.update_status(JobUpdate::default().stage("Fetching profile"));
        store.update_status(JobUpdate::default().progress(45));
        store.update_status(JobUpdate::default().stage("Rendering"));

        let job = store.job().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 45);
        assert_eq!(job.stage, "Rendering");
    }

    #[test]
    fn test_update_for_other_job_is_dropped() {
        let (store, _) = store_with_memory();
        store.set_job(Some(JobRecord::queued("J2", None)));

        let merged = store.update_status(
            JobUpdate::default()
                .for_job("J1")
                .status(JobStatus::Success)
                .progress(100),
        );

        assert!(merged.is_none());
        let job = store.job().unwrap();
        assert_eq!(job.id, "J2");
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn test_terminal_job_rejects_updates() {
        let (store, _) = store_with_memory();
        store.set_job(Some(JobRecord::queued("J1", None)));
        store.update_status(JobUpdate {
            status: Some(JobStatus::Success),
            progress: Some(100),
            output: Some(JobOutput {
                download_url: "/x.pdf".to_string(),
                file_name: None,
                size: None,
            }),
            ..Default::default()
        });

        let merged = store.update_status(JobUpdate::default().status(JobStatus::Running).progress(3));

        assert!(merged.is_none());
        let job = store.job().unwrap();
        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_clear_always_empties() {
        for status in [JobStatus::Queued, JobStatus::Running, JobStatus::Success, JobStatus::Error] {
            let (store, storage) = store_with_memory();
            let mut job = JobRecord::queued("J1", None);
            job.status = status;
            store.set_job(Some(job));

            store.clear();

            assert!(store.job().is_none());
            assert!(storage.read(JOB_KEY).unwrap().is_none());
            assert!(storage.read(JOB_ID_KEY).unwrap().is_none());
        }
    }

    #[test]
    fn test_storage_failures_are_not_fatal() {
        let store = JobStore::new(Arc::new(BrokenStorage));

        store.set_job(Some(JobRecord::queued("J1", None)));
        let merged = store.update_status(JobUpdate::default().status(JobStatus::Running));
        assert_eq!(merged.unwrap().status, JobStatus::Running);

        store.clear();
        assert!(store.job().is_none());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let (store, _) = store_with_memory();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.set_job(Some(JobRecord::queued("J1", None)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().id, "J1");

        // A dropped update does not notify
        store.update_status(JobUpdate::default().for_job("other").progress(5));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_restore_active_snapshot() {
        let storage = MemoryStorage::new();
        let mut job = JobRecord::queued("J1", None);
        job.status = JobStatus::Running;
        job.progress = 55;
        storage
            .write(JOB_KEY, &serde_json::to_string(&job).unwrap())
            .unwrap();

        let store = JobStore::restore(Arc::new(storage));

        assert_eq!(store.job(), Some(job));
    }

    #[test]
    fn test_restore_terminal_snapshot_for_display() {
        let storage = MemoryStorage::new();
        let mut job = JobRecord::queued("J1", None);
        job.status = JobStatus::Error;
        job.error_message = Some("LaTeX failed".to_string());
        storage
            .write(JOB_KEY, &serde_json::to_string(&job).unwrap())
            .unwrap();

        let store = JobStore::restore(Arc::new(storage));

        let restored = store.job().unwrap();
        assert_eq!(restored.status, JobStatus::Error);
        assert_eq!(restored.error_message.as_deref(), Some("LaTeX failed"));
    }

    #[test]
    fn test_restore_corrupt_snapshot_is_discarded() {
        let storage = MemoryStorage::new();
        storage.write(JOB_KEY, "{\"id\": 12").unwrap();
        storage.write(JOB_ID_KEY, "J1").unwrap();

        let store = JobStore::restore(Arc::new(storage.clone()));

        assert!(store.job().is_none());
        assert!(storage.read(JOB_KEY).unwrap().is_none());
        assert!(storage.read(JOB_ID_KEY).unwrap().is_none());
    }

    #[test]
    fn test_restore_legacy_id_seeds_queued_stub() {
        let storage = MemoryStorage::new();
        storage.write(JOB_ID_KEY, "J7\n").unwrap();

        let store = JobStore::restore(Arc::new(storage.clone()));

        let job = store.job().unwrap();
        assert_eq!(job.id, "J7");
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(persisted(&storage), Some(job));
    }

    #[test]
    fn test_restore_with_unreadable_storage() {
        let store = JobStore::restore(Arc::new(BrokenStorage));
        assert!(store.job().is_none());
    }
}
