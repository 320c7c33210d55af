//! Smart search flow: many documents plus a query, one closest match out.

use crate::{
    assist::{AssistApi, ClosestDocument},
    ingestion::{self, DocumentSet},
    orchestrator::{FlowError, dispatch_span},
    state::StateCell,
};
use std::{path::PathBuf, sync::Arc};

/// State and dispatch for the smart search flow.
pub struct SearchFlow {
    client: Arc<dyn AssistApi>,
    accepted_extensions: Vec<String>,
    documents: StateCell<DocumentSet>,
    query: StateCell<String>,
    result: StateCell<Option<ClosestDocument>>,
}

impl SearchFlow {
    pub(crate) fn new(client: Arc<dyn AssistApi>, accepted_extensions: Vec<String>) -> Self {
        Self {
            client,
            accepted_extensions,
            documents: StateCell::default(),
            query: StateCell::default(),
            result: StateCell::default(),
        }
    }

    /// Read every selected file and build a fresh document set without publishing it.
    pub async fn try_load_documents(&self, paths: &[PathBuf]) -> Result<DocumentSet, FlowError> {
        let files = ingestion::collect_paths(paths, &self.accepted_extensions).await?;
        Ok(ingestion::read_documents(&files).await?)
    }

    /// Replace the document set once every file has been read. Any failure keeps the old set.
    pub async fn select_documents(&self, paths: &[PathBuf]) {
        match self.try_load_documents(paths).await {
            Ok(set) => {
                tracing::debug!(documents = set.len(), "Search documents selected");
                self.documents.set(set);
            }
            Err(error) => tracing::error!(%error, "Reading search documents failed"),
        }
    }

    /// Mirror the query input. Empty strings are legal and forwarded unchanged.
    pub fn set_query(&self, query: impl Into<String>) {
        self.query.set(query.into());
    }

    /// Documents that will accompany the next search.
    pub fn documents(&self) -> &StateCell<DocumentSet> {
        &self.documents
    }

    /// Current query text.
    pub fn query(&self) -> &StateCell<String> {
        &self.query
    }

    /// Most recent successful closest match.
    pub fn result(&self) -> &StateCell<Option<ClosestDocument>> {
        &self.result
    }

    /// Run the search without touching the result state.
    pub async fn try_search(&self) -> Result<ClosestDocument, FlowError> {
        let query = self.query.get();
        let documents = self.documents.get();
        Ok(self.client.search(&query, documents.as_slice()).await?)
    }

    /// Run the search and store the closest match; failures leave the previous match.
    pub async fn search(&self) {
        dispatch_span("search", async {
            match self.try_search().await {
                Ok(closest) => {
                    tracing::info!(similarity = closest.similarity, "Closest document received");
                    self.result.set(Some(closest));
                }
                Err(error) => tracing::error!(%error, "Search request failed"),
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
    async fn search_sends_documents_in_selection_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let alpha = dir.path().join("2-alpha.txt");
        let beta = dir.path().join("1-beta.txt");
        fs::write(&alpha, "alpha").expect("write");
        fs::write(&beta, "beta").expect("write");
        let closest = ClosestDocument {
            document: "alpha".into(),
            similarity: 0.9,
        };
        let fake = Arc::new(FakeAssist {
            closest: Some(closest.clone()),
            ..FakeAssist::default()
        });

        let flow = SearchFlow::new(fake.clone(), vec!["txt".into()]);
        flow.select_documents(&[alpha, beta]).await;
        flow.set_query("a");
        flow.search().await;

        assert_eq!(flow.result().get(), Some(closest));
        assert_eq!(
            fake.calls(),
            vec![Call::Search(
                "a".into(),
                vec!["alpha".into(), "beta".into()]
            )]
        );
    }

    #[tokio::test]
    async fn failed_batch_keeps_previous_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        fs::write(&good, "kept").expect("write");
        fs::write(&bad, [0xff, 0xfe]).expect("write");

        let flow = SearchFlow::new(Arc::new(FakeAssist::default()), vec!["txt".into()]);
        flow.select_documents(std::slice::from_ref(&good)).await;
        flow.select_documents(&[good, bad]).await;

        assert_eq!(flow.documents().get().as_slice(), ["kept".to_string()]);
    }

    #[tokio::test]
    async fn first_failed_batch_leaves_set_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let flow = SearchFlow::new(Arc::new(FakeAssist::default()), vec!["txt".into()]);
        flow.select_documents(&[dir.path().join("missing.txt")]).await;
        assert!(flow.documents().get().is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_previous_match() {
        let flow = SearchFlow::new(Arc::new(FakeAssist::failing()), vec!["txt".into()]);
        let previous = ClosestDocument {
            document: "earlier".into(),
            similarity: 0.5,
        };
        flow.result().set(Some(previous.clone()));
        flow.search().await;
        assert_eq!(flow.result().get(), Some(previous));
    }
}
