//! Job DTOs exchanged with the CV API

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobOutput, JobStatus, JobUpdate};

/// Document format requested from the generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvFormat {
    #[default]
    Html,
    Pdf,
}

/// Request to start a CV generation job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateCv {
    #[serde(default)]
    pub format: CvFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
}

/// Response to a job creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedJob {
    pub job_id: String,
    pub status: JobStatus,
}

/// Status snapshot returned by the status endpoint
///
/// Server timestamps are not decoded: the server writes naive local times,
/// so the client stamps updates with its own clock instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub output: Option<JobOutput>,
    /// Flat output fields, as sent by servers that do not nest `output`
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default, alias = "file_name")]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl JobStatusResponse {
    /// Output bundle, preferring the nested form over the flat fields
    pub fn output(&self) -> Option<JobOutput> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        self.download_url.as_ref().map(|url| JobOutput {
            download_url: url.clone(),
            file_name: self.filename.clone(),
            size: self.size,
        })
    }
}

impl From<JobStatusResponse> for JobUpdate {
    fn from(response: JobStatusResponse) -> Self {
        let output = response.output();
        Self {
            id: Some(response.id),
            status: Some(response.status),
            progress: response.progress,
            stage: response.stage,
            error_message: response.error_message,
            output,
            opportunity: None,
            created_at: None,
            updated_at: None,
        }
    }
}
