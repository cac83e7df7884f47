use async_trait::async_trait;

use crate::ticket::AuthTicket;

use super::{DownloadedFile, ListFilter, RepositoryDocument, RepositoryError, StoreRequest};

/// Store, list and fetch against the remote repository.
///
/// Implementations hold no ticket of their own; every call carries the
/// ticket the orchestrator obtained for the current operation.
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Create one object. Not idempotent: two calls create two objects.
    async fn store(
        &self,
        request: StoreRequest,
        ticket: &AuthTicket,
    ) -> Result<RepositoryDocument, RepositoryError>;

    /// Query objects. Filtering is done by the repository.
    async fn list(
        &self,
        filter: &ListFilter,
        ticket: &AuthTicket,
    ) -> Result<Vec<RepositoryDocument>, RepositoryError>;

    /// Download an object's content. Unknown ids yield [`RepositoryError::NotFound`].
    async fn fetch(&self, id: &str, ticket: &AuthTicket)
        -> Result<DownloadedFile, RepositoryError>;

    /// Name of this gateway, for logs
    fn name(&self) -> &'static str;
}
