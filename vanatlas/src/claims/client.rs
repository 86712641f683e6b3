//! Async client for the claims REST API.
//!
//! The API itself is an external collaborator; this client only speaks its
//! JSON wire format: claims CRUD and search, status updates, OCR document
//! processing, and the health probe. No authentication is required.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::types::{Claim, ClaimsError, FormTypes, Health, OcrResult};

/// Claims API client.
#[derive(Clone)]
pub struct ClaimsClient {
    base_url: String,
    client: reqwest::Client,
}

impl ClaimsClient {
    /// Create a client against a base URL (no trailing slash), e.g.
    /// `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClaimsError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ClaimsError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClaimsError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClaimsError::Http(format!(
                "HTTP {} from claims API",
                status
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClaimsError::InvalidResponse(e.to_string()))
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health, ClaimsError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    /// `GET /api/v1/claims`
    pub async fn list_claims(&self) -> Result<Vec<Claim>, ClaimsError> {
        let response = self
            .client
            .get(self.url("/api/v1/claims"))
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        let claims: Vec<Claim> = Self::decode(response).await?;
        debug!(count = claims.len(), "Claims listed");
        Ok(claims)
    }

    /// `GET /api/v1/claims/search?q=`
    pub async fn search_claims(&self, query: &str) -> Result<Vec<Claim>, ClaimsError> {
        let response = self
            .client
            .get(self.url("/api/v1/claims/search"))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    /// `POST /api/v1/claims`
    pub async fn create_claim(&self, claim: &Claim) -> Result<Claim, ClaimsError> {
        let response = self
            .client
            .post(self.url("/api/v1/claims"))
            .json(claim)
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        let created: Claim = Self::decode(response).await?;
        info!(claimant = created.claimant_name, "Claim created");
        Ok(created)
    }

    /// `PUT /api/v1/claims/{id}/status`
    pub async fn update_status(&self, id: i64, status: &str) -> Result<Claim, ClaimsError> {
        let response = self
            .client
            .put(self.url(&format!("/api/v1/claims/{}/status", id)))
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    /// `DELETE /api/v1/claims/{id}`
    ///
    /// Succeeds on 2xx and 404 alike; deleting an already-deleted claim is
    /// not an error for the caller.
    pub async fn delete_claim(&self, id: i64) -> Result<(), ClaimsError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v1/claims/{}", id)))
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(ClaimsError::Http(format!(
                "HTTP {} deleting claim {}",
                status, id
            )))
        }
    }

    /// `POST /api/v1/ocr/process-document`
    ///
    /// Uploads document bytes for OCR extraction.
    pub async fn process_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<OcrResult, ClaimsError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/v1/ocr/process-document"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    /// `GET /api/v1/ocr/form-types`
    pub async fn form_types(&self) -> Result<FormTypes, ClaimsError> {
        let response = self
            .client
            .get(self.url("/api/v1/ocr/form-types"))
            .send()
            .await
            .map_err(|e| ClaimsError::Http(e.to_string()))?;
        Self::decode(response).await
    }
}
