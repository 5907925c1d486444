//! Dossier HTTP Client
//!
//! A small, type-safe HTTP client for the CV generation API.
//!
//! The tracker uses it as both of its collaborators: the job creator
//! (`POST /api/cv/generate`) and the status fetcher
//! (`GET /api/cv/status/{id}`).
//!
//! # Example
//!
//! ```no_run
//! use dossier_client::DossierClient;
//! use dossier_core::dto::job::GenerateCv;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dossier_client::ClientError> {
//!     let client = DossierClient::new("http://localhost:8000");
//!
//!     let created = client.generate_cv(GenerateCv::default()).await?;
//!     let status = client.get_job_status(&created.job_id).await?;
//!
//!     println!("job {} is {}", status.id, status.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

pub use error::{ClientError, Result};
pub use jobs::resolve_download_url;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the CV API
#[derive(Debug, Clone)]
pub struct DossierClient {
    /// Base URL of the API (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl DossierClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use dossier_client::DossierClient;
    ///
    /// let client = DossierClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use dossier_client::DossierClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = DossierClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
