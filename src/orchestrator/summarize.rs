//! Summarization flow: one file in, one summary out.

use crate::{
    assist::AssistApi,
    ingestion::{self, PendingUpload},
    orchestrator::{FlowError, dispatch_span},
    state::StateCell,
};
use std::{path::Path, sync::Arc};

/// State and dispatch for the summarization flow.
pub struct SummarizeFlow {
    client: Arc<dyn AssistApi>,
    accepted_extensions: Vec<String>,
    upload: StateCell<Option<PendingUpload>>,
    result: StateCell<Option<String>>,
}

impl SummarizeFlow {
    pub(crate) fn new(client: Arc<dyn AssistApi>, accepted_extensions: Vec<String>) -> Self {
        Self {
            client,
            accepted_extensions,
            upload: StateCell::default(),
            result: StateCell::default(),
        }
    }

    /// Replace the pending upload. A rejected selection keeps the previous one.
    pub async fn select_file(&self, path: &Path) {
        match ingestion::select_file(path, &self.accepted_extensions).await {
            Ok(upload) => {
                tracing::debug!(file = %upload.file_name, "Summary file selected");
                self.upload.set(Some(upload));
            }
            Err(error) => tracing::warn!(%error, "Summary file selection rejected"),
        }
    }

    /// Currently selected upload.
    pub fn upload(&self) -> &StateCell<Option<PendingUpload>> {
        &self.upload
    }

    /// Most recent successful summary.
    pub fn result(&self) -> &StateCell<Option<String>> {
        &self.result
    }

    /// Request a summary without touching the result state.
    pub async fn try_summarize(&self) -> Result<String, FlowError> {
        let upload = self.upload.get().ok_or(FlowError::NoFileSelected)?;
        let response = self.client.summarize(&upload).await?;
        Ok(response.summary)
    }

    /// Request a summary and store it; failures are logged and leave the previous summary.
    pub async fn summarize(&self) {
        dispatch_span("summarize", async {
            match self.try_summarize().await {
                Ok(summary) => {
                    tracing::info!(chars = summary.len(), "Summary received");
                    self.result.set(Some(summary));
                }
                Err(error) => tracing::error!(%error, "Summarize request failed"),
            }
        })
        .await
    }
}
