use thiserror::Error;

use super::{IndexFilter, IndexRecord};

#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Index record has no repository id")]
    MissingRepositoryId,

    #[error("No indexed document matches the filter")]
    NotFound,

    #[error("Index connection is closed")]
    Closed,

    #[error("Index database error: {0}")]
    Database(String),
}

/// Trait for metadata index implementations.
pub trait MetadataIndex: Send + Sync {
    /// Write one record. Records with a blank repository id are rejected
    /// before anything is written.
    fn insert(&self, record: &IndexRecord) -> Result<(), IndexError>;

    /// Repository id of the most recently indexed record matching every
    /// key present in `filter`.
    fn find_one(&self, filter: &IndexFilter) -> Result<String, IndexError>;

    /// Release the underlying handle. Later calls fail with [`IndexError::Closed`].
    fn close(&self) -> Result<(), IndexError> {
        Ok(())
    }
}
