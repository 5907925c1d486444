//! Job domain types
//!
//! A `JobRecord` is the client's view of one server-side CV generation job.
//! The server owns execution; the client only observes, merging partial
//! `JobUpdate`s into the record it tracks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage label given to a freshly created job
pub const QUEUED_STAGE: &str = "Queued";

/// Job execution status
///
/// `Success` and `Error` are terminal: once reached the job never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Error,
}

impl JobStatus {
    /// Returns true for `Success` and `Error`
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }

    /// Returns true while the job may still change server-side
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated document produced by a successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutput {
    /// Download path, usually relative to the API base URL
    #[serde(alias = "url")]
    pub download_url: String,
    #[serde(default, alias = "filename", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The tracked job
///
/// This is also the persisted snapshot format: the whole record is
/// serialized on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    /// Percentage in `0..=100`, only meaningful while the job is active
    pub progress: u8,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JobOutput>,
    /// Opportunity the CV is being tailored for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Builds the stub record seeded right after a job was created
    pub fn queued(id: impl Into<String>, opportunity: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            progress: 0,
            stage: QUEUED_STAGE.to_string(),
            error_message: None,
            output: None,
            opportunity,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Merges a partial update into the record
    ///
    /// Every field the update supplies overwrites the current value; absent
    /// fields are left alone. Progress is clamped to 100.
    pub fn merge(&mut self, update: JobUpdate) {
        let JobUpdate {
            id,
            status,
            progress,
            stage,
            error_message,
            output,
            opportunity,
            created_at,
            updated_at,
        } = update;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(progress) = progress {
            self.progress = progress.min(100);
        }
        if let Some(stage) = stage {
            self.stage = stage;
        }
        if let Some(error_message) = error_message {
            self.error_message = Some(error_message);
        }
        if let Some(output) = output {
            self.output = Some(output);
        }
        if let Some(opportunity) = opportunity {
            self.opportunity = Some(opportunity);
        }
        if let Some(created_at) = created_at {
            self.created_at = created_at;
        }
        if let Some(updated_at) = updated_at {
            self.updated_at = updated_at;
        }
    }
}

/// Partial job record
///
/// `None` means "not supplied"; a JSON `null` deserializes to `None` as well,
/// so it never erases a value during a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JobOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobUpdate {
    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn for_job(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns true if applying this update would finish the job
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(JobStatus::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_terminality() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(JobStatus::Running.is_active());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(JobStatus::Running).unwrap(), json!("running"));
        let status: JobStatus = serde_json::from_value(json!("success")).unwrap();
        assert_eq!(status, JobStatus::Success);
        assert!(serde_json::from_value::<JobStatus>(json!("cancelled")).is_err());
        assert_eq!(JobStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_queued_stub() {
        let job = JobRecord::queued("J1", None);
        assert_eq!(job.id, "J1");
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert_eq!(job.stage, QUEUED_STAGE);
        assert!(job.output.is_none());
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_merge_keeps_unsupplied_fields() {
        let mut job = JobRecord::queued("J1", Some("acme-backend".to_string()));
        job.merge(
            JobUpdate::default()
                .status(JobStatus::Running)
                .progress(10)
                .stage("Rendering"),
        );

        assert_eq!(job.id, "J1");
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 10);
        assert_eq!(job.stage, "Rendering");
        assert_eq!(job.opportunity.as_deref(), Some("acme-backend"));

        job.merge(JobUpdate::default().progress(40));
        assert_eq!(job.stage, "Rendering");
        assert_eq!(job.progress, 40);
    }

    #[test]
    fn test_merge_is_last_write_wins_per_field() {
        let updates = vec![
            JobUpdate::default().progress(5).stage("Loading"),
            JobUpdate::default().status(JobStatus::Running),
            JobUpdate::default().progress(30),
            JobUpdate::default().stage("Rendering").progress(60),
            JobUpdate::default(),
        ];

        let mut job = JobRecord::queued("J1", None);
        for update in updates {
            job.merge(update);
        }

        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 60);
        assert_eq!(job.stage, "Rendering");
    }

    #[test]
    fn test_merge_clamps_progress() {
        let mut job = JobRecord::queued("J1", None);
        job.merge(JobUpdate::default().progress(250));
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_null_fields_do_not_erase() {
        let mut job = JobRecord::queued("J1", None);
        job.merge(JobUpdate::default().stage("Rendering"));

        let update: JobUpdate =
            serde_json::from_value(json!({ "stage": null, "progress": 20 })).unwrap();
        job.merge(update);

        assert_eq!(job.stage, "Rendering");
        assert_eq!(job.progress, 20);
    }

    #[test]
    fn test_output_accepts_short_field_names() {
        let output: JobOutput =
            serde_json::from_value(json!({ "url": "/x.pdf", "filename": "x.pdf", "size": 2048 }))
                .unwrap();
        assert_eq!(output.download_url, "/x.pdf");
        assert_eq!(output.file_name.as_deref(), Some("x.pdf"));
        assert_eq!(output.size, Some(2048));
    }

    #[test]
    fn test_record_snapshot_roundtrip() {
        let mut job = JobRecord::queued("J1", None);
        job.merge(JobUpdate {
            status: Some(JobStatus::Error),
            error_message: Some("template missing".to_string()),
            ..Default::default()
        });

        let text = serde_json::to_string(&job).unwrap();
        let restored: JobRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, job);
    }
}
