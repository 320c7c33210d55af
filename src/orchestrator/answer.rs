//! Question answering flow: one file plus a question, one answer out.

use crate::{
    assist::AssistApi,
    ingestion::{self, PendingUpload},
    orchestrator::{FlowError, dispatch_span},
    state::StateCell,
};
use std::{path::Path, sync::Arc};

/// State and dispatch for the question answering flow.
pub struct AnswerFlow {
    client: Arc<dyn AssistApi>,
    accepted_extensions: Vec<String>,
    upload: StateCell<Option<PendingUpload>>,
    question: StateCell<String>,
    result: StateCell<Option<String>>,
}

impl AnswerFlow {
    pub(crate) fn new(client: Arc<dyn AssistApi>, accepted_extensions: Vec<String>) -> Self {
        Self {
            client,
            accepted_extensions,
            upload: StateCell::default(),
            question: StateCell::default(),
            result: StateCell::default(),
        }
    }

    /// Replace the context file. A rejected selection keeps the previous one.
    pub async fn select_file(&self, path: &Path) {
        match ingestion::select_file(path, &self.accepted_extensions).await {
            Ok(upload) => {
                tracing::debug!(file = %upload.file_name, "Context file selected");
                self.upload.set(Some(upload));
            }
            Err(error) => tracing::warn!(%error, "Context file selection rejected"),
        }
    }

    /// Mirror the question input. Empty strings are legal and forwarded unchanged.
    pub fn set_question(&self, question: impl Into<String>) {
        self.question.set(question.into());
    }

    /// Currently selected context file.
    pub fn upload(&self) -> &StateCell<Option<PendingUpload>> {
        &self.upload
    }

    /// Current question text.
    pub fn question(&self) -> &StateCell<String> {
        &self.question
    }

    /// Most recent successful answer.
    pub fn result(&self) -> &StateCell<Option<String>> {
        &self.result
    }

    /// Ask the current question without touching the result state.
    pub async fn try_ask(&self) -> Result<String, FlowError> {
        let upload = self.upload.get().ok_or(FlowError::NoFileSelected)?;
        let question = self.question.get();
        let response = self.client.answer(&upload, &question).await?;
        Ok(response.answer)
    }

    /// Ask the current question and store the answer; failures leave the previous answer.
    pub async fn ask(&self) {
        dispatch_span("ask", async {
            match self.try_ask().await {
                Ok(answer) => {
                    tracing::info!(chars = answer.len(), "Answer received");
                    self.result.set(Some(answer));
                }
                Err(error) => tracing::error!(%error, "Ask request failed"),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::{Call, FakeAssist};
    use std::fs;

    #[tokio::test]
    async fn question_is_sent_literally_and_answer_stored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("context.txt");
        fs::write(&path, "Ferris is a crab.").expect("write");
        let fake = Arc::new(FakeAssist {
            answer: "A".into(),
            ..FakeAssist::default()
        });

        let flow = AnswerFlow::new(fake.clone(), vec!["txt".into()]);
        flow.select_file(&path).await;
        flow.set_question("  What is Ferris?  ");
        flow.ask().await;

        assert_eq!(flow.result().get().as_deref(), Some("A"));
        assert_eq!(
            fake.calls(),
            vec![Call::Answer(
                "context.txt".into(),
                "  What is Ferris?  ".into()
            )]
        );
    }

    #[tokio::test]
    async fn failure_keeps_previous_answer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("context.txt");
        fs::write(&path, "ctx").expect("write");

        let flow = AnswerFlow::new(Arc::new(FakeAssist::failing()), vec!["txt".into()]);
        flow.result().set(Some("old".into()));
        flow.select_file(&path).await;
        flow.ask().await;

        assert_eq!(flow.result().get().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn question_updates_replace_previous_text() {
        let flow = AnswerFlow::new(Arc::new(FakeAssist::default()), vec!["txt".into()]);
        flow.set_question("W");
        flow.set_question("Wh");
        assert_eq!(flow.question().get(), "Wh");
    }
}
