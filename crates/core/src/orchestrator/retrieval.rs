//! Search-then-fetch retrieval.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::index::{IndexError, IndexFilter, MetadataIndex, SearchQuery};
use crate::metadata::ValidationError;
use crate::metrics::RETRIEVALS;
use crate::repository::{DownloadedFile, RepositoryError, RepositoryGateway};

use super::{DocumentError, RetrievedDocument, TicketSource};

pub struct RetrievalOrchestrator {
    tickets: TicketSource,
    repository: Arc<dyn RepositoryGateway>,
    index: Arc<dyn MetadataIndex>,
}

impl RetrievalOrchestrator {
    pub fn new(
        tickets: TicketSource,
        repository: Arc<dyn RepositoryGateway>,
        index: Arc<dyn MetadataIndex>,
    ) -> Self {
        Self {
            tickets,
            repository,
            index,
        }
    }

    /// Resolve `query` through the index, then fetch the content.
    ///
    /// An index miss is [`DocumentError::NotIndexed`] and the repository is
    /// not contacted. An index hit the repository does not know is
    /// [`DocumentError::IndexOutOfSync`].
    pub async fn search_and_fetch(
        &self,
        query: &SearchQuery,
    ) -> Result<RetrievedDocument, DocumentError> {
        let result = self.resolve_and_fetch(query).await;
        let outcome = match &result {
            Ok(_) => "found",
            Err(e) => e.kind(),
        };
        RETRIEVALS.with_label_values(&["search", outcome]).inc();
        result
    }

    async fn resolve_and_fetch(
        &self,
        query: &SearchQuery,
    ) -> Result<RetrievedDocument, DocumentError> {
        let filter = IndexFilter::from_query(query);
        if filter.tax_id.is_none() {
            return Err(ValidationError::missing(["tax_id"]).into());
        }

        let ticket = self.tickets.ticket().await?;

        let id = match self.index.find_one(&filter) {
            Ok(id) => id,
            Err(IndexError::NotFound) => {
                debug!(?filter, "No index match");
                return Err(DocumentError::NotIndexed);
            }
            Err(e) => return Err(DocumentError::Index(e)),
        };

        match self.repository.fetch(&id, &ticket).await {
            Ok(file) => {
                info!(id = %id, file_name = %file.file_name, "Document retrieved by search");
                Ok(RetrievedDocument {
                    repository_id: id,
                    file,
                })
            }
            Err(RepositoryError::NotFound { .. }) => {
                warn!(id = %id, "Index points at a document the repository does not have");
                Err(DocumentError::IndexOutOfSync { id })
            }
            Err(e) => Err(DocumentError::Repository(e)),
        }
    }

    /// Fetch by repository id.
    pub async fn fetch_by_id(&self, id: &str) -> Result<DownloadedFile, DocumentError> {
        let result = self.fetch(id).await;
        let outcome = match &result {
            Ok(_) => "found",
            Err(e) => e.kind(),
        };
        RETRIEVALS.with_label_values(&["by_id", outcome]).inc();
        result
    }

    async fn fetch(&self, id: &str) -> Result<DownloadedFile, DocumentError> {
        let ticket = self.tickets.ticket().await?;
        self.repository
            .fetch(id, &ticket)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound { id } => DocumentError::NotFound { id },
                other => DocumentError::Repository(other),
            })
    }
}
