//! Errors surfaced by the orchestrators.

use thiserror::Error;

use crate::index::IndexError;
use crate::metadata::ValidationError;
use crate::repository::RepositoryError;
use crate::ticket::TicketError;

/// Outcome of a failed orchestrated operation.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Ticket issuance failed. Fatal to the request.
    #[error("{0}")]
    Authentication(#[from] TicketError),

    /// The repository does not know the requested object.
    #[error("document not found")]
    NotFound { id: String },

    /// No index record matched the search.
    #[error("no documents match the search criteria")]
    NotIndexed,

    /// The index points at an object the repository no longer has.
    #[error("indexed document {id} is missing from the repository")]
    IndexOutOfSync { id: String },

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Index(IndexError),
}

impl DocumentError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::Validation(_) => "validation",
            DocumentError::Authentication(_) => "authentication",
            DocumentError::NotFound { .. } => "not_found",
            DocumentError::NotIndexed => "not_indexed",
            DocumentError::IndexOutOfSync { .. } => "index_out_of_sync",
            DocumentError::Repository(_) => "repository",
            DocumentError::Index(_) => "index",
        }
    }
}
