#![deny(missing_docs)]

//! Core library for the Rusty Assist client.

/// Remote summarization, question answering, and search client.
pub mod assist;
/// Environment-driven configuration management.
pub mod config;
/// File selection and concurrent document loading.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// Independent request flows and their state.
pub mod orchestrator;
/// Projection of result state into displayed text.
pub mod render;
/// Interactive session over stdin/stdout.
pub mod shell;
/// Observable state containers.
pub mod state;
