use thiserror::Error;

/// Errors returned by a [`RepositoryGateway`](super::RepositoryGateway).
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The repository does not know this object id.
    #[error("Document not found in repository: {id}")]
    NotFound { id: String },

    #[error("Repository request timed out")]
    Timeout,

    #[error("Repository connection failed: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("Repository returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid repository response: {0}")]
    InvalidResponse(String),

    #[error("Repository client configuration error: {0}")]
    Configuration(String),
}

impl RepositoryError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Transport(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
