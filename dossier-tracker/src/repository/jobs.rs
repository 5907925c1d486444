//! Jobs repository
//!
//! Handles communication with the CV API for job-related operations:
//! - Creating a generation job
//! - Fetching the status of a job

use anyhow::Result;
use async_trait::async_trait;
use dossier_client::DossierClient;
use dossier_core::domain::job::JobUpdate;
use dossier_core::dto::job::{CreatedJob, GenerateCv};

/// Fetches the server-side status of a job
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Returns the current status snapshot of `job_id` as a partial update
    ///
    /// Any error is treated as transient by the poller.
    async fn fetch_status(&self, job_id: &str) -> Result<JobUpdate>;
}

/// Creates server-side generation jobs
#[async_trait]
pub trait JobCreator: Send + Sync {
    /// Asks the server to start a job
    ///
    /// # Arguments
    /// * `req` - Generation parameters
    async fn create_job(&self, req: GenerateCv) -> Result<CreatedJob>;
}

/// HTTP implementation of both job collaborators
#[derive(Debug, Clone)]
pub struct HttpJobRepository {
    client: DossierClient,
}

impl HttpJobRepository {
    /// Creates a repository talking to the API at `api_url`
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(DossierClient::new(api_url))
    }

    /// Creates a repository over an existing client
    pub fn with_client(client: DossierClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusFetcher for HttpJobRepository {
    async fn fetch_status(&self, job_id: &str) -> Result<JobUpdate> {
        let response = self.client.get_job_status(job_id).await.map_err(|e| {
            let reason = if e.is_not_found() {
                "job unknown to the server"
            } else if e.is_server_error() {
                "server error"
            } else {
                "request failed"
            };
            anyhow::Error::new(e).context(format!(
                "Failed to fetch status of job {} ({})",
                job_id, reason
            ))
        })?;

        Ok(response.into())
    }
}

#[async_trait]
impl JobCreator for HttpJobRepository {
    async fn create_job(&self, req: GenerateCv) -> Result<CreatedJob> {
        self.client.generate_cv(req).await.map_err(|e| {
            let message = if e.is_client_error() {
                "Server rejected the generation request"
            } else {
                "Failed to create generation job"
            };
            anyhow::Error::new(e).context(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_is_reported_with_job_id() {
        let repository = HttpJobRepository::new("http://127.0.0.1:1");

        let err = repository.fetch_status("J1").await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to fetch status of job J1 (request failed)"));

        let err = repository
            .create_job(GenerateCv::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create generation job"));
    }
}
