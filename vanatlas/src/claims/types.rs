//! Claims API data types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A forest-rights claim record as served by the claims API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default)]
    pub id: Option<i64>,
    pub claimant_name: String,
    #[serde(default)]
    pub village_name: Option<String>,
    pub district: String,
    pub state: String,
    /// IFR, CR or CFR.
    pub form_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub ocr_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<serde_json::Value>,
}

/// Result of OCR document processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    #[serde(default)]
    pub form_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub extracted_fields: Option<serde_json::Value>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

/// Form types supported by the OCR pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTypes {
    #[serde(default)]
    pub form_types: Vec<String>,
}

/// Service health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Errors from claims API operations.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// Request failed or the server returned a non-success status.
    #[error("Claims API error: {0}")]
    Http(String),

    /// Response body did not match the expected schema.
    #[error("Claims API returned an invalid response: {0}")]
    InvalidResponse(String),
}
