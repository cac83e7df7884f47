use serde::Serialize;

use crate::filetype;
use crate::metadata::{DocumentMetadata, ValidationError};
use crate::repository::{DownloadedFile, RepositoryDocument};

/// A single document to ingest.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub content: Vec<u8>,
    pub file_name: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Reject content outside the PDF/JPEG/PNG allow-list.
    pub require_supported_type: bool,
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReceipt {
    pub document: RepositoryDocument,
    /// Whether the index write after the store succeeded.
    pub indexed: bool,
}

/// One entry of a batch, as received.
#[derive(Debug, Clone)]
pub enum BatchItem {
    Ready(IngestRequest),
    /// Payload could not be decoded; reported as an error entry.
    Rejected {
        file_name: String,
        error: ValidationError,
    },
}

impl BatchItem {
    pub fn from_base64(file_name: String, payload: &str, metadata: DocumentMetadata) -> Self {
        match filetype::decode_base64(payload) {
            Ok(content) => BatchItem::Ready(IngestRequest {
                content,
                file_name,
                metadata,
            }),
            Err(error) => BatchItem::Rejected { file_name, error },
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            BatchItem::Ready(request) => &request.file_name,
            BatchItem::Rejected { file_name, .. } => file_name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Fills blank fields of every item's metadata.
    pub common_metadata: Option<DocumentMetadata>,
    pub require_supported_type: bool,
}

/// Per-item batch outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Success {
        index: usize,
        repository_id: String,
        file_name: String,
        tax_id: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        legal_name: String,
        indexed: bool,
    },
    Error {
        index: usize,
        file_name: String,
        error: String,
    },
}

impl BatchEntry {
    pub fn index(&self) -> usize {
        match self {
            BatchEntry::Success { index, .. } | BatchEntry::Error { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchEntry::Success { .. })
    }
}

/// Batch outcome. `results` follows input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn from_entries(results: Vec<BatchEntry>) -> Self {
        let succeeded = results.iter().filter(|e| e.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

/// A document located through the index and fetched from the repository.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub repository_id: String,
    pub file: DownloadedFile,
}
