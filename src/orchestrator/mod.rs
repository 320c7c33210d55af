//! Request orchestration for the three independent flows.
//!
//! Each flow owns its own input cells and result cell; nothing is shared between flows apart
//! from the HTTP client. Dispatches log and swallow failures, leaving the previous result in
//! place. Same-flow requests are not ordered or cancelled, so when two are in flight the one
//! that completes last wins.

mod answer;
mod search;
mod summarize;

pub use answer::AnswerFlow;
pub use search::SearchFlow;
pub use summarize::SummarizeFlow;

use crate::{assist::AssistApi, assist::AssistError, ingestion::IngestError, render::ViewState};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Errors raised while running a single flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Dispatch was requested before any file was selected.
    #[error("no file selected")]
    NoFileSelected,
    /// Selecting or reading files failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// The remote endpoint could not be reached or rejected the request.
    #[error(transparent)]
    Assist(#[from] AssistError),
}

/// Bundles the summarization, question answering, and search flows.
pub struct Orchestrator {
    /// Summarization flow.
    pub summarize: SummarizeFlow,
    /// Question answering flow.
    pub answer: AnswerFlow,
    /// Smart search flow.
    pub search: SearchFlow,
}

impl Orchestrator {
    /// Build the three flows around a shared client and accepted-extension list.
    pub fn new(client: Arc<dyn AssistApi>, accepted_extensions: Vec<String>) -> Self {
        Self {
            summarize: SummarizeFlow::new(client.clone(), accepted_extensions.clone()),
            answer: AnswerFlow::new(client.clone(), accepted_extensions.clone()),
            search: SearchFlow::new(client, accepted_extensions),
        }
    }

    /// Snapshot of every result cell, ready for rendering.
    pub fn view(&self) -> ViewState {
        ViewState {
            summary: self.summarize.result().get(),
            answer: self.answer.result().get(),
            closest: self.search.result().get(),
        }
    }

    /// Fire-and-forget summarization.
    pub fn spawn_summarize(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.summarize.summarize().await })
    }

    /// Fire-and-forget question answering.
    pub fn spawn_ask(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.answer.ask().await })
    }

    /// Fire-and-forget smart search.
    pub fn spawn_search(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.search.search().await })
    }
}

/// Wrap one dispatch in a `dispatch` span carrying `flow` and a fresh `request_id`.
pub(crate) fn dispatch_span<F>(flow: &'static str, future: F) -> tracing::instrument::Instrumented<F>
where
    F: std::future::Future,
{
    let request_id = Uuid::new_v4();
    future.instrument(tracing::info_span!("dispatch", flow, %request_id))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        assist::{AnswerResponse, AssistApi, AssistError, ClosestDocument, SummaryResponse},
        ingestion::PendingUpload,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Recorded call made against [`FakeAssist`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Summarize(String),
        Answer(String, String),
        Search(String, Vec<String>),
    }

    /// In-memory [`AssistApi`] that answers from canned values or fails on demand.
    #[derive(Default)]
    pub struct FakeAssist {
        pub fail: bool,
        pub summary: String,
        pub answer: String,
        pub closest: Option<ClosestDocument>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeAssist {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn outcome<T>(&self, value: T) -> Result<T, AssistError> {
            if self.fail {
                Err(AssistError::UnexpectedStatus {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".into(),
                })
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl AssistApi for FakeAssist {
        async fn summarize(&self, upload: &PendingUpload) -> Result<SummaryResponse, AssistError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(Call::Summarize(upload.file_name.clone()));
            self.outcome(SummaryResponse {
                summary: self.summary.clone(),
            })
        }

        async fn answer(
            &self,
            upload: &PendingUpload,
            question: &str,
        ) -> Result<AnswerResponse, AssistError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(Call::Answer(upload.file_name.clone(), question.to_string()));
            self.outcome(AnswerResponse {
                answer: self.answer.clone(),
            })
        }

        async fn search(
            &self,
            query: &str,
            documents: &[String],
        ) -> Result<ClosestDocument, AssistError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(Call::Search(query.to_string(), documents.to_vec()));
            let closest = self.closest.clone().unwrap_or(ClosestDocument {
                document: String::new(),
                similarity: 0.0,
            });
            self.outcome(closest)
        }
    }
}
