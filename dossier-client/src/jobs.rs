//! CV job endpoints

use crate::DossierClient;
use crate::error::Result;
use dossier_core::domain::job::JobOutput;
use dossier_core::dto::job::{CreatedJob, GenerateCv, JobStatusResponse};

impl DossierClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Ask the server to start generating a CV
    ///
    /// The job runs server-side; the returned id is what the status
    /// endpoint is queried with.
    ///
    /// # Example
    /// ```no_run
    /// # use dossier_client::DossierClient;
    /// # use dossier_core::dto::job::GenerateCv;
    /// # async fn example() -> Result<(), dossier_client::ClientError> {
    /// let client = DossierClient::new("http://localhost:8000");
    /// let created = client.generate_cv(GenerateCv::default()).await?;
    /// println!("queued job {}", created.job_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn generate_cv(&self, req: GenerateCv) -> Result<CreatedJob> {
        let url = format!("{}/api/cv/generate", self.base_url);
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Get the current status snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - The id returned by [`DossierClient::generate_cv`]
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        let url = format!("{}/api/cv/status/{}", self.base_url, job_id);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Downloads
    // =============================================================================

    /// Absolute download URL for a job output
    ///
    /// Relative paths are resolved against the base URL; absolute URLs are
    /// returned unchanged.
    pub fn download_url(&self, output: &JobOutput) -> String {
        resolve_download_url(&self.base_url, &output.download_url)
    }
}

/// Resolves a download path against an API base URL
pub fn resolve_download_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
