//! HTTP client wrapper for the assist endpoints.

use crate::{
    assist::types::{AnswerResponse, AssistError, ClosestDocument, SearchRequest, SummaryResponse},
    ingestion::PendingUpload,
};
use async_trait::async_trait;
use reqwest::{
    Client, Response,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;

/// Path of the summarization endpoint, relative to the base URL.
pub const SUMMARIZE_PATH: &str = "/summarize/";
/// Path of the question answering endpoint, relative to the base URL.
pub const QA_PATH: &str = "/qa/";
/// Path of the smart search endpoint, relative to the base URL.
pub const SEARCH_PATH: &str = "/search/";

/// Operations offered by the remote assist service.
#[async_trait]
pub trait AssistApi: Send + Sync {
    /// Upload a file and return the generated summary.
    async fn summarize(&self, upload: &PendingUpload) -> Result<SummaryResponse, AssistError>;

    /// Upload a file together with a question and return the extracted answer.
    async fn answer(
        &self,
        upload: &PendingUpload,
        question: &str,
    ) -> Result<AnswerResponse, AssistError>;

    /// Send a query and decoded documents, returning the closest match.
    async fn search(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<ClosestDocument, AssistError>;
}

/// Lightweight reqwest-backed implementation of [`AssistApi`].
pub struct HttpAssistClient {
    client: Client,
    base_url: String,
}

impl HttpAssistClient {
    /// Construct a client targeting `base_url`.
    pub fn new(base_url: &str) -> Result<Self, AssistError> {
        let client = Client::builder()
            .user_agent(concat!("rusty-assist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(AssistError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized assist HTTP client");
        Ok(Self { client, base_url })
    }

    /// Normalized base URL used for every request.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format_endpoint(&self.base_url, path)
    }

    async fn upload_form(upload: &PendingUpload) -> Result<Form, AssistError> {
        let bytes = upload.read_bytes().await?;
        let part = Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload_mime(&upload.file_name))?;
        Ok(Form::new().part("file", part))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AssistError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AssistError::UnexpectedStatus { status, body })
        }
    }
}

#[async_trait]
impl AssistApi for HttpAssistClient {
    async fn summarize(&self, upload: &PendingUpload) -> Result<SummaryResponse, AssistError> {
        let form = Self::upload_form(upload).await?;
        tracing::debug!(file = %upload.file_name, "Posting summarization request");
        let response = self
            .client
            .post(self.endpoint(SUMMARIZE_PATH))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn answer(
        &self,
        upload: &PendingUpload,
        question: &str,
    ) -> Result<AnswerResponse, AssistError> {
        let form = Self::upload_form(upload).await?;
        tracing::debug!(
            file = %upload.file_name,
            question_len = question.len(),
            "Posting question answering request"
        );
        let response = self
            .client
            .post(self.endpoint(QA_PATH))
            .query(&[("question", question)])
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn search(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<ClosestDocument, AssistError> {
        tracing::debug!(documents = documents.len(), "Posting search request");
        let response = self
            .client
            .post(self.endpoint(SEARCH_PATH))
            .json(&SearchRequest { query, documents })
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// Content type sent with an upload, guessed from its file name.
fn upload_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .to_string()
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
