//! Client for the remote summarization, question answering, and search endpoints.

pub mod client;
pub mod types;

pub use client::{AssistApi, HttpAssistClient, QA_PATH, SEARCH_PATH, SUMMARIZE_PATH};
pub use types::{AnswerResponse, AssistError, ClosestDocument, SearchRequest, SummaryResponse};
