//! Ingestion limits.

use serde::{Deserialize, Serialize};

/// Configuration for document ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Largest accepted document, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: usize,

    /// Most documents accepted in one batch request.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Batch items processed at once. 1 processes items one after another.
    /// Results are always reported in input order.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Reject anything but PDF, JPEG and PNG on multipart uploads too.
    /// Base64 uploads always enforce the allow-list.
    #[serde(default)]
    pub restrict_content_types: bool,
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

fn default_max_batch_size() -> usize {
    100
}

fn default_batch_concurrency() -> usize {
    1
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            max_batch_size: default_max_batch_size(),
            batch_concurrency: default_batch_concurrency(),
            restrict_content_types: false,
        }
    }
}
