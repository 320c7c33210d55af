//! Wire types and errors shared by the assist client.

use crate::ingestion::IngestError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while talking to the assist endpoints.
#[derive(Debug, Error)]
pub enum AssistError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    /// Upload contents could not be read from disk.
    #[error("Failed to read upload: {0}")]
    Upload(#[from] IngestError),
    /// HTTP layer failed before or while receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Endpoint responded with a non-success status code.
    #[error("Unexpected response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the endpoint.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Response body of `POST /summarize/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryResponse {
    /// Generated summary text.
    pub summary: String,
}

/// Response body of `POST /qa/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerResponse {
    /// Extracted answer text.
    pub answer: String,
}

/// Request body of `POST /search/`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    /// Free-text query.
    pub query: &'a str,
    /// Decoded documents, in selection order.
    pub documents: &'a [String],
}

/// Closest match returned by `POST /search/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClosestDocument {
    /// Text of the best matching document.
    pub document: String,
    /// Similarity score reported by the service.
    pub similarity: f64,
}
