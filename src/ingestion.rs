//! File selection and document loading.
//!
//! Single-file selections only capture a handle; bytes are read when the upload is dispatched.
//! Multi-file selections are read eagerly and concurrently, and the batch is exposed only once
//! every read has succeeded.

use futures_util::future::try_join_all;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while selecting or reading files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File extension is not in the accepted list.
    #[error("{path} is not an accepted file type (accepted: {accepted})")]
    Rejected {
        /// Path that was refused.
        path: PathBuf,
        /// Human readable list of accepted extensions.
        accepted: String,
    },
    /// Path could not be inspected or decoded.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path whose read failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Blocking traversal task panicked or was cancelled.
    #[error("directory traversal task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    /// Directory traversal failed.
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Root of the traversal.
        path: PathBuf,
        /// Underlying walkdir error.
        #[source]
        source: walkdir::Error,
    },
}

/// Reference to a user-selected file that has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Location of the file on disk.
    pub path: PathBuf,
    /// File name sent alongside the multipart upload.
    pub file_name: String,
}

impl PendingUpload {
    /// Read the full contents of the referenced file.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, IngestError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| IngestError::Read {
                path: self.path.clone(),
                source,
            })
    }
}

/// Fully decoded text contents of every selected file, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet(Vec<String>);

impl DocumentSet {
    /// Wrap already decoded documents.
    pub fn new(documents: Vec<String>) -> Self {
        Self(documents)
    }

    /// Borrow the documents as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of documents in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no documents.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether `path` carries one of the accepted extensions. An empty list accepts everything.
pub fn is_accepted(path: &Path, accepted: &[String]) -> bool {
    if accepted.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| accepted.iter().any(|candidate| *candidate == ext))
}

fn rejected(path: &Path, accepted: &[String]) -> IngestError {
    IngestError::Rejected {
        path: path.to_path_buf(),
        accepted: accepted
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Capture a handle to a single file without reading its bytes.
pub async fn select_file(path: &Path, accepted: &[String]) -> Result<PendingUpload, IngestError> {
    if !is_accepted(path, accepted) {
        return Err(rejected(path, accepted));
    }

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if !metadata.is_file() {
        return Err(IngestError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(PendingUpload {
        path: path.to_path_buf(),
        file_name,
    })
}

/// Expand a selection into concrete file paths on the blocking pool.
///
/// Explicit files keep their position and must be accepted; directories contribute their
/// accepted files in name order.
pub async fn collect_paths(
    paths: &[PathBuf],
    accepted: &[String],
) -> Result<Vec<PathBuf>, IngestError> {
    let paths = paths.to_vec();
    let accepted = accepted.to_vec();
    tokio::task::spawn_blocking(move || walk_selection(&paths, &accepted)).await?
}

fn walk_selection(paths: &[PathBuf], accepted: &[String]) -> Result<Vec<PathBuf>, IngestError> {
    let mut collected = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|source| IngestError::Walk {
                    path: path.clone(),
                    source,
                })?;
                if entry.file_type().is_file() && is_accepted(entry.path(), accepted) {
                    collected.push(entry.into_path());
                }
            }
        } else if is_accepted(path, accepted) {
            collected.push(path.clone());
        } else {
            return Err(rejected(path, accepted));
        }
    }
    Ok(collected)
}

/// Read every file to completion concurrently; any failure fails the whole batch.
pub async fn read_documents(paths: &[PathBuf]) -> Result<DocumentSet, IngestError> {
    let reads = paths.iter().map(|path| async move {
        tokio::fs::read_to_string(path)
            .await
            .map(strip_bom)
            .map_err(|source| IngestError::Read {
                path: path.clone(),
                source,
            })
    });

    let documents = try_join_all(reads).await?;
    tracing::debug!(documents = documents.len(), "Document batch loaded");
    Ok(DocumentSet::new(documents))
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
